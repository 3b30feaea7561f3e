//! # Hour Pillar Derivation
//!
//! The hour pillar follows from the Day Master and the clock hour by the
//! traditional "five rats" rule (五鼠遁): the stem of the 子 hour is fixed by
//! the day stem, and each later double-hour advances stem and branch by one.
//!
//! | Day stem | 子-hour stem |
//! |----------|--------------|
//! | 甲 己 | 甲 |
//! | 乙 庚 | 丙 |
//! | 丙 辛 | 戊 |
//! | 丁 壬 | 庚 |
//! | 戊 癸 | 壬 |

use crate::{Branch, MingpanError, Pillar, Stem};

/// Last valid clock hour.
const MAX_CLOCK_HOUR: u32 = 23;

/// Stem of the 子 hour for a given day stem.
#[must_use]
pub const fn zi_hour_stem(day_stem: Stem) -> Stem {
    match day_stem {
        Stem::Jia | Stem::Ji => Stem::Jia,
        Stem::Yi | Stem::Geng => Stem::Bing,
        Stem::Bing | Stem::Xin => Stem::Wu,
        Stem::Ding | Stem::Ren => Stem::Geng,
        Stem::Wu | Stem::Gui => Stem::Ren,
    }
}

/// Branch of the double-hour (时辰) containing a clock hour.
///
/// 23:00 and 00:00 both fall in 子.
pub fn hour_branch(hour: u32) -> Result<Branch, MingpanError> {
    if hour > MAX_CLOCK_HOUR {
        return Err(MingpanError::InvalidHour(hour));
    }
    Ok(Branch::from_index(((hour + 1) / 2) as usize % 12))
}

/// Hour pillar for a Day Master and clock hour (0-23).
pub fn hour_pillar(day_stem: Stem, hour: u32) -> Result<Pillar, MingpanError> {
    let branch = hour_branch(hour)?;
    let stem = Stem::from_index(zi_hour_stem(day_stem).index() + branch.index());
    Ok(Pillar::new(stem, branch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bing_day_at_ten_is_gui_si() {
        let pillar = hour_pillar(Stem::Bing, 10).expect("pillar");
        assert_eq!(pillar.to_string(), "癸巳");
    }

    #[test]
    fn late_and_early_zi_share_a_branch() {
        assert_eq!(hour_branch(23).expect("branch"), Branch::Zi);
        assert_eq!(hour_branch(0).expect("branch"), Branch::Zi);
        assert_eq!(hour_branch(1).expect("branch"), Branch::Chou);
        assert_eq!(hour_branch(22).expect("branch"), Branch::Hai);
    }

    #[test]
    fn zi_hour_follows_five_rats() {
        assert_eq!(hour_pillar(Stem::Jia, 0).expect("pillar").to_string(), "甲子");
        assert_eq!(hour_pillar(Stem::Geng, 0).expect("pillar").to_string(), "丙子");
        assert_eq!(hour_pillar(Stem::Xin, 0).expect("pillar").to_string(), "戊子");
        assert_eq!(hour_pillar(Stem::Ren, 0).expect("pillar").to_string(), "庚子");
        assert_eq!(hour_pillar(Stem::Gui, 0).expect("pillar").to_string(), "壬子");
    }

    #[test]
    fn every_hour_pillar_is_sexagenary() {
        for stem in Stem::ALL {
            for hour in 0..=23 {
                assert!(hour_pillar(stem, hour).expect("pillar").is_sexagenary());
            }
        }
    }

    #[test]
    fn rejects_out_of_range_hour() {
        assert!(matches!(
            hour_pillar(Stem::Jia, 24),
            Err(MingpanError::InvalidHour(24))
        ));
    }
}
