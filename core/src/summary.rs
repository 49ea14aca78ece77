/// Shorten a driver error to its first clause, cutting at the first `.`.
///
/// Falls back to the trimmed full message when the clause would be empty,
/// and to a fixed placeholder when the message itself is empty.
pub fn summarize(message: &str) -> String {
    let full = message.trim();
    let first = full.split('.').next().unwrap_or_default().trim();
    if !first.is_empty() {
        first.to_string()
    } else if !full.is_empty() {
        full.to_string()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuts_at_first_period() {
        let msg = "The client is unauthorized due to authentication failure. Neo.ClientError.Security";
        assert_eq!(summarize(msg), "The client is unauthorized due to authentication failure");
    }

    #[test]
    fn keeps_message_without_period() {
        assert_eq!(summarize("connection refused"), "connection refused");
    }

    #[test]
    fn never_empty() {
        assert_eq!(summarize(".hidden"), ".hidden");
        assert_eq!(summarize("   "), "unknown error");
    }
}
