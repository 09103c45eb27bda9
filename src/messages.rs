//! User-facing strings. The page is Japanese only.

pub const NAME_REQUIRED: &str = "お名前を入力してください。";
pub const QUICK_DATE_REQUIRED: &str = "日時を選択してください。";
pub const QUICK_SENT: &str = "送信しました。追ってご連絡します。";

pub const EMAIL_INVALID: &str = "有効なメールアドレスを入力してください。";
pub const CONTACT_DATE_REQUIRED: &str = "ご希望日時を入力してください。";
pub const DATE_NOT_FUTURE: &str = "未来の日付を選択してください。";
pub const CONTACT_SENT: &str = "ご予約ありがとうございます。追ってご連絡いたします。";

/// Accessible name of the indicator dot for the `index`-th review (0-based).
pub fn review_dot_label(index: usize) -> String {
    format!("レビュー {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_labels_are_one_based() {
        assert_eq!(review_dot_label(0), "レビュー 1");
        assert_eq!(review_dot_label(9), "レビュー 10");
    }
}
