use uuid::Uuid;

/// `<driver id>-<order id in 32 hex digits>`
pub fn tracking_number(driver_id: &str, order_id: Uuid) -> String {
    format!("{}-{}", driver_id, order_id.simple())
}

pub fn order_id_of(tracking_number: &str) -> Option<Uuid> {
    let (driver_id, suffix) = tracking_number.trim().rsplit_once('-')?;
    if driver_id.is_empty() || suffix.len() != 32 {
        return None;
    }
    Uuid::try_parse(suffix).ok()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{order_id_of, tracking_number};

    #[test]
    fn order_id_survives_dashes_in_driver_id() {
        let order_id = Uuid::new_v4();
        let number = tracking_number("tg-5512-77", order_id);
        assert_eq!(order_id_of(&number), Some(order_id));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(order_id_of("nonsense"), None);
        assert_eq!(order_id_of("-0123456789abcdef0123456789abcdef"), None);
        assert_eq!(order_id_of("d-1-1234"), None);
        let hyphenated = Uuid::new_v4().hyphenated().to_string();
        assert_eq!(order_id_of(&format!("d-1-{hyphenated}")), None);
    }
}
