//! Chinese numeral spellings for date components.

/// Spellings for 1 through 10.
const DIGITS: [&str; 11] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// Spell a month or day number the way calendar descriptions write it.
///
/// Covers 1 through 39 ("一" .. "三十九"). Anything else comes back as the
/// plain decimal string.
pub fn to_chinese_numeral(value: u32) -> String {
    let (prefix, rest) = match value {
        1..=10 => return DIGITS[value as usize].to_string(),
        11..=19 => ("十", value - 10),
        20..=29 => ("二十", value - 20),
        30..=39 => ("三十", value - 30),
        _ => return value.to_string(),
    };
    format!("{}{}", prefix, DIGITS[rest as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_single_digits_and_ten() {
        assert_eq!(to_chinese_numeral(1), "一");
        assert_eq!(to_chinese_numeral(9), "九");
        assert_eq!(to_chinese_numeral(10), "十");
    }

    #[test]
    fn spells_teens_without_leading_one() {
        assert_eq!(to_chinese_numeral(11), "十一");
        assert_eq!(to_chinese_numeral(19), "十九");
    }

    #[test]
    fn omits_zero_digit_for_round_tens() {
        assert_eq!(to_chinese_numeral(20), "二十");
        assert_eq!(to_chinese_numeral(30), "三十");
    }

    #[test]
    fn spells_twenties_and_thirties() {
        assert_eq!(to_chinese_numeral(24), "二十四");
        assert_eq!(to_chinese_numeral(31), "三十一");
        assert_eq!(to_chinese_numeral(39), "三十九");
    }

    #[test]
    fn falls_back_to_decimal_out_of_range() {
        assert_eq!(to_chinese_numeral(40), "40");
        assert_eq!(to_chinese_numeral(0), "0");
    }
}
