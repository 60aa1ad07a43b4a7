use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::render;
    use crate::cli::OutputFormat;

    #[test]
    fn raw_is_single_line() {
        let value = json!([{"recordId": "H1"}, 2]);
        let rendered = render(&value, OutputFormat::Raw).unwrap();
        assert_eq!(rendered, r#"[{"recordId":"H1"},2]"#);
    }

    #[test]
    fn json_is_pretty() {
        let rendered = render(&json!([1]), OutputFormat::Json).unwrap();
        assert_eq!(rendered, "[\n  1\n]");
    }
}
