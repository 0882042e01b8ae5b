//! Assembly of the generation context blob.

/// Concatenate selected paths and their fetched contents into one text blob.
///
/// `paths` and `contents` correspond positionally; a `None` content means the
/// file could not be read and its section is omitted entirely (no
/// placeholder). Pure function: identical inputs always produce identical
/// output.
pub fn assemble_context(paths: &[String], contents: &[Option<String>]) -> String {
    let mut blob = String::from("Project File Structure and Contents:\n\n");

    for (path, content) in paths.iter().zip(contents) {
        if let Some(content) = content {
            blob.push_str(&format!("--- File: {path} ---\n{content}\n\n"));
        }
    }

    blob
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labels_each_present_file() {
        let blob = assemble_context(
            &paths(&["package.json", "src/app.js"]),
            &[Some("{}".to_string()), Some("console.log(1);".to_string())],
        );

        assert!(blob.starts_with("Project File Structure and Contents:\n\n"));
        assert!(blob.contains("--- File: package.json ---\n{}\n"));
        assert!(blob.contains("--- File: src/app.js ---\nconsole.log(1);\n"));
    }

    #[test]
    fn absent_contents_are_skipped_without_placeholder() {
        let blob = assemble_context(
            &paths(&["a.js", "b.js", "c.js"]),
            &[Some("aaa".to_string()), None, Some("ccc".to_string())],
        );

        assert!(!blob.contains("b.js"));
        assert!(blob.contains("--- File: a.js ---"));
        assert!(blob.contains("--- File: c.js ---"));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let p = paths(&["go.mod"]);
        let c = vec![Some("module x".to_string())];
        assert_eq!(assemble_context(&p, &c), assemble_context(&p, &c));
    }

    #[test]
    fn all_absent_yields_header_only() {
        let blob = assemble_context(&paths(&["a", "b"]), &[None, None]);
        assert_eq!(blob, "Project File Structure and Contents:\n\n");
    }
}
