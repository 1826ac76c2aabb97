//! Astronomical primitives for the lunisolar calendar.
//!
//! Julian day numbers, new-moon instants (Meeus' series truncated as in
//! Hồ Ngọc Đức's tables) and apparent solar longitude, all rounded to local
//! civil days at a given UTC offset.

use std::f64::consts::PI;

/// Julian day of the new moon with lunation number 0 (1900-01-01).
pub const EPOCH_NEW_MOON: f64 = 2_415_021.076_998_695;

/// Mean synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530_588_853;

const DEG: f64 = PI / 180.0;

/// Julian day number of a Gregorian date.
pub fn jd_from_date(year: i32, month: u32, day: u32) -> i64 {
    let (year, month, day) = (i64::from(year), i64::from(month), i64::from(day));
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

/// Gregorian `(year, month, day)` of a Julian day number.
pub fn jd_to_date(jd: i64) -> (i32, u32, u32) {
    let a = jd + 32044;
    let b = (4 * a + 3) / 146_097;
    let c = a - b * 146_097 / 4;
    let d = (4 * c + 3) / 1461;
    let e = c - 1461 * d / 4;
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = b * 100 + d - 4800 + m / 10;
    (year as i32, month as u32, day as u32)
}

/// Julian date (UT) of the `k`-th new moon after 1900-01-01.
pub fn new_moon(k: i64) -> f64 {
    let k = k as f64;
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;

    let mut jd1 = 2_415_020.759_33 + 29.530_588_68 * k + 0.000_117_8 * t2 - 0.000_000_155 * t3;
    jd1 += 0.000_33 * ((166.56 + 132.87 * t - 0.009_173 * t2) * DEG).sin();

    // mean anomalies of sun and moon, moon's argument of latitude
    let m = 359.2242 + 29.105_356_08 * k - 0.000_033_3 * t2 - 0.000_003_47 * t3;
    let mpr = 306.0253 + 385.816_918_06 * k + 0.010_730_6 * t2 + 0.000_012_36 * t3;
    let f = 21.2964 + 390.670_506_46 * k - 0.001_652_8 * t2 - 0.000_002_39 * t3;

    let mut c1 = (0.1734 - 0.000_393 * t) * (m * DEG).sin() + 0.0021 * (2.0 * m * DEG).sin();
    c1 += -0.4068 * (mpr * DEG).sin() + 0.0161 * (2.0 * mpr * DEG).sin();
    c1 -= 0.0004 * (3.0 * mpr * DEG).sin();
    c1 += 0.0104 * (2.0 * f * DEG).sin() - 0.0051 * ((m + mpr) * DEG).sin();
    c1 += -0.0074 * ((m - mpr) * DEG).sin() + 0.0004 * ((2.0 * f + m) * DEG).sin();
    c1 += -0.0004 * ((2.0 * f - m) * DEG).sin() - 0.0006 * ((2.0 * f + mpr) * DEG).sin();
    c1 += 0.0010 * ((2.0 * f - mpr) * DEG).sin() + 0.0005 * ((2.0 * mpr + m) * DEG).sin();

    let delta_t = if t < -11.0 {
        0.001 + 0.000_839 * t + 0.000_226_1 * t2 - 0.000_008_45 * t3 - 0.000_000_081 * t * t3
    } else {
        -0.000_278 + 0.000_265 * t + 0.000_262 * t2
    };

    jd1 + c1 - delta_t
}

/// Apparent solar longitude in radians, normalised to `[0, 2π)`, at Julian date `jd`.
pub fn sun_longitude(jd: f64) -> f64 {
    let t = (jd - 2_451_545.0) / 36525.0;
    let t2 = t * t;

    let m = 357.529_10 + 35_999.050_30 * t - 0.000_155_9 * t2 - 0.000_000_48 * t * t2;
    let l0 = 280.466_45 + 36_000.769_83 * t + 0.000_303_2 * t2;
    let mut dl = (1.914_600 - 0.004_817 * t - 0.000_014 * t2) * (DEG * m).sin();
    dl += (0.019_993 - 0.000_101 * t) * (DEG * 2.0 * m).sin() + 0.000_290 * (DEG * 3.0 * m).sin();

    let l = (l0 + dl) * DEG;
    l - 2.0 * PI * (l / (2.0 * PI)).floor()
}

/// Local civil day (Julian day number) of the `k`-th new moon.
pub fn new_moon_day(k: i64, tz_hours: f64) -> i64 {
    (new_moon(k) + 0.5 + tz_hours / 24.0).floor() as i64
}

/// Index `0..=11` of the 30° solar-longitude sector at the start of local day `jdn`.
///
/// Sector 9 starts at the winter solstice; each boundary is a major solar term.
pub fn sun_sector(jdn: i64, tz_hours: f64) -> i64 {
    (sun_longitude(jdn as f64 - 0.5 - tz_hours / 24.0) / PI * 6.0).floor() as i64
}

/// Lunation number whose new moon falls on or before local day `jdn`,
/// together with the local day that month starts on.
pub fn lunation_containing(jdn: i64, tz_hours: f64) -> (i64, i64) {
    // the mean-lunation guess can miss the true new moon by a day either way
    let mut k = ((jdn as f64 - EPOCH_NEW_MOON) / SYNODIC_MONTH).floor() as i64;
    let mut start = new_moon_day(k, tz_hours);
    while start > jdn {
        k -= 1;
        start = new_moon_day(k, tz_hours);
    }
    loop {
        let next = new_moon_day(k + 1, tz_hours);
        if next > jdn {
            return (k, start);
        }
        k += 1;
        start = next;
    }
}

/// Lunation number and start day of month 11 (the month holding the winter
/// solstice) of Gregorian year `year`.
pub fn month_eleven(year: i32, tz_hours: f64) -> (i64, i64) {
    let off = jd_from_date(year, 12, 31) - 2_415_021;
    let k = (off as f64 / SYNODIC_MONTH).floor() as i64;
    let start = new_moon_day(k, tz_hours);
    if sun_sector(start, tz_hours) >= 9 {
        (k - 1, new_moon_day(k - 1, tz_hours))
    } else {
        (k, start)
    }
}

/// Offset, counted in months after month 11 at lunation `k11`, of the first
/// month that contains no major solar term.
pub fn leap_month_offset(k11: i64, tz_hours: f64) -> i64 {
    let mut i = 1;
    let mut arc = sun_sector(new_moon_day(k11 + i, tz_hours), tz_hours);
    loop {
        let last = arc;
        i += 1;
        arc = sun_sector(new_moon_day(k11 + i, tz_hours), tz_hours);
        if arc == last || i >= 14 {
            return i - 1;
        }
    }
}
