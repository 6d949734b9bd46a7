//! Outgoing text composition.

/// Build the text sent for one submission.
///
/// Attachments are referenced by file name only; their content is never read.
/// Returns `None` when there is nothing to send.
pub fn compose_outgoing(text: &str, attachment: Option<&str>) -> Option<String> {
    let text = text.trim();
    match attachment.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => Some(format!("{} [附件: {}]", text, name)),
        None if text.is_empty() => None,
        None => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(compose_outgoing("  hi \n", None), Some("hi".to_string()));
    }

    #[test]
    fn test_attachment_marker_appended() {
        assert_eq!(
            compose_outgoing("请总结", Some("报告.pdf")),
            Some("请总结 [附件: 报告.pdf]".to_string())
        );
    }

    #[test]
    fn test_attachment_alone_is_sendable() {
        assert_eq!(
            compose_outgoing("   ", Some("a.docx")),
            Some(" [附件: a.docx]".to_string())
        );
    }

    #[test]
    fn test_nothing_to_send() {
        assert_eq!(compose_outgoing("  ", None), None);
        assert_eq!(compose_outgoing("", Some(" ")), None);
    }
}
