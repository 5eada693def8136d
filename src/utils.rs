/// Parse an ISO8601 duration string (PT1H2M3S, each component optional) to
/// total seconds.
pub fn parse_iso8601_duration_to_seconds(duration_str: &str) -> i64 {
    if duration_str.is_empty() {
        return 0;
    }

    if !duration_str.starts_with("PT") {
        return 0;
    }

    let duration_part = &duration_str[2..];
    let mut total_seconds = 0.0;
    let mut current_number = String::new();

    for ch in duration_part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            current_number.push(ch);
        } else {
            if let Ok(num) = current_number.parse::<f64>() {
                match ch {
                    'H' => total_seconds += num * 3600.0,
                    'M' => total_seconds += num * 60.0,
                    'S' => total_seconds += num,
                    _ => {}
                }
            }
            current_number.clear();
        }
    }

    total_seconds as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_duration() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT1H2M3S"), 3723);
    }

    #[test]
    fn parses_partial_components() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT3M"), 180);
        assert_eq!(parse_iso8601_duration_to_seconds("PT2M59S"), 179);
        assert_eq!(parse_iso8601_duration_to_seconds("PT45S"), 45);
        assert_eq!(parse_iso8601_duration_to_seconds("PT2H"), 7200);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_iso8601_duration_to_seconds(""), 0);
        assert_eq!(parse_iso8601_duration_to_seconds("1h30m"), 0);
    }
}
