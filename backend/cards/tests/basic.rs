#![allow(clippy::unwrap_used, clippy::expect_used)]

use cards::{CardExpiration, CardExpirationMonth, CardExpirationYear, CardSecurityCode};
use common_utils::date_time;
use hyperswitch_masking::PeekInterface;

#[test]
fn test_card_security_code() {
    let valid_card_security_code = CardSecurityCode::new("123".to_string()).unwrap();
    assert_eq!(valid_card_security_code.peek(), "123");
    assert!(CardSecurityCode::new("12".to_string()).is_err());
    assert!(CardSecurityCode::new("12a".to_string()).is_err());

    let serialized = serde_json::to_string(&valid_card_security_code).unwrap();
    assert_eq!(serialized, r#""123""#);

    let deserialized = serde_json::from_str::<CardSecurityCode>(r#""4321""#).unwrap();
    assert_eq!(deserialized.peek(), "4321");
    assert!(serde_json::from_str::<CardSecurityCode>(r#""00""#).is_err());
}

#[test]
fn test_card_expiration_month() {
    let card_exp_month = CardExpirationMonth::new(3).unwrap();
    assert_eq!(*card_exp_month.peek(), 3);
    assert_eq!(card_exp_month.two_digits(), "03");
    assert!(CardExpirationMonth::new(13).is_err());
    assert!(CardExpirationMonth::new(0).is_err());
    assert!(serde_json::from_str::<CardExpirationMonth>("13").is_err());
}

#[test]
fn test_card_expiration_year() {
    let year = CardExpirationYear::new(30).unwrap();
    assert_eq!(year.four_digits(), "2030");
    assert_eq!(year.two_digits(), "30");
    assert!(CardExpirationYear::new(1900).is_err());
}

#[test]
fn test_card_expiration() {
    let curr_date = date_time::now();
    let curr_year = u16::try_from(curr_date.year()).expect("valid year");
    let curr_month = u8::from(curr_date.month());

    let current = CardExpiration::new(curr_month, curr_year).unwrap();
    assert!(!current.is_expired());

    let last_year = CardExpiration::new(curr_month, curr_year - 1).unwrap();
    assert!(last_year.is_expired());

    let expiration = CardExpiration::new(9, 2031).unwrap();
    assert_eq!(expiration.mm_yy("/").peek(), "09/31");
    assert_eq!(expiration.yyyy_mm("-").peek(), "2031-09");
}
