//! Vietnamese names for lunar dates.

use chrono::{Datelike, Weekday};

use super::{LunarDate, SolarDate};

/// Month names, index 0 is month 1 ("tháng Giêng"), index 11 is month 12 ("tháng Chạp").
pub const MONTH_NAMES: [&str; 12] = [
    "Giêng", "Hai", "Ba", "Tư", "Năm", "Sáu", "Bảy", "Tám", "Chín", "Mười", "Mười một", "Chạp",
];

/// Heavenly stems, starting from Giáp.
pub const CAN: [&str; 10] = ["Giáp", "Ất", "Bính", "Đinh", "Mậu", "Kỷ", "Canh", "Tân", "Nhâm", "Quý"];

/// Earthly branches, starting from Tý.
pub const CHI: [&str; 12] = [
    "Tý", "Sửu", "Dần", "Mão", "Thìn", "Tỵ", "Ngọ", "Mùi", "Thân", "Dậu", "Tuất", "Hợi",
];

const LEAP_SUFFIX: &str = " (nhuận)";

/// Name of lunar month `month`, or `None` outside `1..=12`.
///
/// ```
/// use shared::lunar::vietnamese;
///
/// assert_eq!(Some("Chạp"), vietnamese::month_name(12));
/// ```
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Can Chi name of a lunar year, e.g. "Giáp Thìn" for 2024.
pub fn can_chi(year: i32) -> String {
    let can = CAN[(year + 6).rem_euclid(10) as usize];
    let chi = CHI[(year + 8).rem_euclid(12) as usize];
    format!("{can} {chi}")
}

/// Long form: "Ngày 15 tháng Tám năm 2024", with " (nhuận)" for leap months.
pub fn long_date(date: &LunarDate) -> String {
    let month = month_name(date.month).unwrap_or("?");
    let mut rt = format!("Ngày {} tháng {} năm {}", date.day, month, date.year);
    if date.is_leap_month {
        rt += LEAP_SUFFIX;
    }
    rt
}

/// Short form: "15/8/2024", with " (nhuận)" for leap months.
pub fn short_date(date: &LunarDate) -> String {
    let mut rt = format!("{}/{}/{}", date.day, date.month, date.year);
    if date.is_leap_month {
        rt += LEAP_SUFFIX;
    }
    rt
}

/// Day of week of a solar date ("Thứ Hai" … "Chủ Nhật").
pub fn weekday(date: &SolarDate) -> Option<&'static str> {
    let name = match date.to_naive().ok()?.weekday() {
        Weekday::Mon => "Thứ Hai",
        Weekday::Tue => "Thứ Ba",
        Weekday::Wed => "Thứ Tư",
        Weekday::Thu => "Thứ Năm",
        Weekday::Fri => "Thứ Sáu",
        Weekday::Sat => "Thứ Bảy",
        Weekday::Sun => "Chủ Nhật",
    };
    Some(name)
}

/// Solar date as "dd/mm/yyyy".
pub fn solar_date(date: &SolarDate) -> String {
    format!("{:02}/{:02}/{}", date.day, date.month, date.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(Some("Giêng"), month_name(1));
        assert_eq!(Some("Mười một"), month_name(11));
        assert_eq!(None, month_name(0));
        assert_eq!(None, month_name(13));
    }

    #[test]
    fn test_year_names() {
        for (std, year) in [("Giáp Thìn", 2024), ("Ất Tỵ", 2025), ("Quý Mão", 2023), ("Giáp Tý", 1984)] {
            assert_eq!(std, can_chi(year));
        }
    }

    #[test]
    fn test_formatted_dates() {
        let mid_autumn = LunarDate::new(2024, 8, 15, false);
        assert_eq!("Ngày 15 tháng Tám năm 2024", long_date(&mid_autumn));
        assert_eq!("15/8/2024", short_date(&mid_autumn));

        let leap = LunarDate::new(2023, 2, 1, true);
        assert_eq!("Ngày 1 tháng Hai năm 2023 (nhuận)", long_date(&leap));
        assert_eq!("1/2/2023 (nhuận)", short_date(&leap));
    }

    #[test]
    fn test_weekdays() {
        let date = SolarDate::new(2024, 9, 17).unwrap();
        assert_eq!(Some("Thứ Ba"), weekday(&date));
        assert_eq!("17/09/2024", solar_date(&date));
    }
}
