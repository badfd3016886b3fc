use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

/// Calendar dates travel as `YYYY-MM-DD` strings everywhere in the API.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Today's date in UTC, formatted like every stored date.
pub fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(DATE_FORMAT)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_is_an_iso_date() {
        assert!(crate::validation::is_iso_date(&today()));
    }
}
