use rstest::rstest;
use serde_json::{Value, json};
use taskmd_core::{DateResolver, json2md, md2json, md2json_with};
use time::macros::datetime;

fn resolver() -> DateResolver {
    DateResolver::new(datetime!(2024-03-13 15:30 UTC))
}

#[rstest]
#[case("", "data is null or empty")]
#[case("no heading here", "data is missing a name heading")]
#[case("#  \nbody", "data is missing a name heading")]
#[case("##   \n\nbody", "data is missing a name heading")]
#[case("---\n- a\n- b\n---\n# T", "invalid front matter content")]
#[case("---\nkey: [unclosed\n---\n# T", "invalid front matter content")]
#[case("---\nowner: ana\n---\n", "invalid markdown (markdown is empty)")]
#[case("# T\n\n## Metadata\n\n```yaml\n- a\n```", "invalid metadata content")]
#[case("# T\n\n## Metadata\n\n```yaml\n```", "invalid metadata content")]
#[case("---\ncreated: not-a-date\n---\n# T", "unable to parse created date")]
#[case("---\ndue: whenever\n---\n# T", "unable to parse due date")]
#[case("---\ndue: in 999999999999999 days\n---\n# T", "unable to parse due date")]
#[case(
    "# T\n\n## Comments\n\n- date: 99999999999999 weeks ago\n  hi",
    "comments must contain a list (unable to parse comment date)"
)]
#[case("---\nprogress: lots\n---\n# T", "progress value is not numeric")]
#[case("---\ntags: [1]\n---\n# T", "instance.tags[0] is not of a type(s) string")]
#[case("# T\n\n## Sub-tasks\n\nnot a list", "sub-tasks must contain a list")]
#[case("# T\n\n## Relations\n\nnot a list", "relations must contain a list")]
#[case("# T\n\n## Comments\n\nnot a list", "comments must contain a list")]
#[case(
    "# T\n\n## Comments\n\n- date: someday maybe\n  hi",
    "comments must contain a list (unable to parse comment date)"
)]
fn decode_failures_name_their_reason(#[case] markdown: &str, #[case] reason: &str) {
    let err = md2json_with(markdown, &resolver()).unwrap_err();
    assert_eq!(err.to_string(), format!("Unable to parse task: {reason}"));
}

#[test]
fn default_entry_point_reports_missing_name() {
    let err = md2json("no heading here").unwrap_err();
    assert!(err.to_string().contains("data is missing a name heading"));
}

#[rstest]
#[case(json!(null), "data is null or empty")]
#[case(json!(false), "data is null or empty")]
#[case(json!(0), "data is null or empty")]
#[case(json!(""), "data is null or empty")]
#[case(json!("text"), "data is not an object")]
#[case(json!([]), "data is not an object")]
#[case(json!({}), "data object is missing name")]
#[case(json!({ "name": "" }), "data object is missing name")]
#[case(json!({ "name": 7 }), "data object is missing name")]
#[case(
    json!({ "name": "X", "subTasks": [{ "text": "a", "completed": "yes" }] }),
    "instance[0].completed is not of a type(s) boolean"
)]
#[case(
    json!({ "name": "X", "relations": [{ "task": "b" }] }),
    "instance[0] requires property \"type\""
)]
#[case(
    json!({ "name": "X", "metadata": { "progress": "10" } }),
    "instance.progress is not of a type(s) number"
)]
fn encode_failures_name_their_reason(#[case] data: Value, #[case] reason: &str) {
    let err = json2md(&data).unwrap_err();
    assert_eq!(err.to_string(), format!("Unable to build task: {reason}"));
}

#[test]
fn encoder_rejects_non_timestamp_dates() {
    let err = json2md(&json!({ "name": "X", "metadata": { "created": "tomorrow" } })).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Unable to build task: instance.created "));
    assert!(message.contains("date-time"));
}
