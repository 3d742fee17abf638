//! Tests for the command-line helpers.

use recordio::cli::{
    choices, parse_indent, parse_key_val, parse_options, render_record, DEFAULT_INDENT,
};
use recordio::driver::Family;
use recordio::testing::record;
use recordio::Error;
use serde_json::json;

#[test]
fn test_parse_key_val_decodes_json() -> anyhow::Result<()> {
    assert_eq!(parse_key_val("level=9")?, ("level".to_string(), json!(9)));
    assert_eq!(
        parse_key_val("skip_failures=true")?,
        ("skip_failures".to_string(), json!(true))
    );
    assert_eq!(parse_key_val("name=ais")?, ("name".to_string(), json!("ais")));
    assert_eq!(parse_key_val("empty=")?, ("empty".to_string(), json!("")));
    assert_eq!(parse_key_val("expr=a=b")?, ("expr".to_string(), json!("a=b")));
    assert_eq!(
        parse_key_val("fields=[\"mmsi\",\"lat\"]")?,
        ("fields".to_string(), json!(["mmsi", "lat"]))
    );
    Ok(())
}

#[test]
fn test_parse_key_val_rejects_malformed() {
    for raw in ["level", "=9", " =9"] {
        let err = parse_key_val(raw).unwrap_err();
        assert!(
            matches!(err, Error::InvalidArgument { ref argument, .. } if argument == raw),
            "{raw}: {err:?}"
        );
    }
}

#[test]
fn test_parse_options_later_keys_win() -> anyhow::Result<()> {
    let options = parse_options(["level=1", "skip_failures=false", "level=6"])?;
    assert_eq!(options.len(), 2);
    assert_eq!(options["level"], json!(6));
    assert_eq!(options["skip_failures"], json!(false));
    Ok(())
}

#[test]
fn test_parse_indent() -> anyhow::Result<()> {
    assert_eq!(parse_indent("none")?, None);
    assert_eq!(parse_indent("None")?, None);
    assert_eq!(parse_indent("2")?, Some(2));
    assert_eq!(parse_indent(&DEFAULT_INDENT.to_string())?, Some(4));
    assert!(matches!(parse_indent("two"), Err(Error::InvalidArgument { .. })));
    assert!(parse_indent("-1").is_err());
    Ok(())
}

#[test]
fn test_render_record() -> anyhow::Result<()> {
    let r = record(json!({"mmsi": 366053209}));
    assert_eq!(render_record(&r, None)?, "{\"mmsi\":366053209}");
    assert_eq!(render_record(&r, Some(2))?, "{\n  \"mmsi\": 366053209\n}");
    assert_eq!(render_record(&r, Some(0))?, "{\n\"mmsi\": 366053209\n}");
    Ok(())
}

#[cfg(all(
    feature = "format-jsonl",
    feature = "format-msgpack",
    feature = "compression-gzip"
))]
#[test]
fn test_choices() -> anyhow::Result<()> {
    let formats = choices(Family::Format)?;
    assert!(formats.contains(&"newlinejson".to_string()));
    assert!(formats.contains(&"msgpack".to_string()));
    assert!(!formats.contains(&"none".to_string()));

    let compressions = choices(Family::Compression)?;
    assert!(compressions.contains(&"gzip".to_string()));
    assert_eq!(compressions.last().map(String::as_str), Some("none"));
    Ok(())
}
