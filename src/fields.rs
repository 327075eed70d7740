use serde::{Deserialize, Deserializer};

/// Deserializes a `String`, treating an explicit `null` as the empty
/// string so absent values never reach the view as nulls.
pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(deserializer)?;

    Ok(value.unwrap_or_default())
}

/// Formats an ISO date for display, falling back to "Not specified" when
/// the value is blank.
///
/// ```
/// use faculty::fields::display_date;
/// assert_eq!(display_date("2024-01-05"), "5 January 2024");
/// assert_eq!(display_date(""), "Not specified");
/// ```
pub fn display_date(value: &str) -> String {
    if value.is_empty() {
        return "Not specified".to_owned();
    }

    match time::Date::parse(value, "%F") {
        Ok(date) => date.format("%-d %B %Y"),
        // an unparseable date is displayed as submitted
        Err(_) => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::display_date;

    #[test]
    fn blank_dates_are_not_specified() {
        assert_eq!(display_date(""), "Not specified");
    }

    #[test]
    fn iso_dates_are_humanized() {
        assert_eq!(display_date("2023-09-01"), "1 September 2023");
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(display_date("soon"), "soon");
    }
}
