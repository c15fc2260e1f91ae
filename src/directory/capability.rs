// longer terms first so `реф` does not eat the front of `рефрижератор`
const ALIASES: &[(&str, &str)] = &[
    ("рефрижератор", "refrigerator"),
    ("изотермический", "isotherm"),
    ("изотерма", "isotherm"),
    ("контейнеровоз", "container"),
    ("контейнер", "container"),
    ("самосвал", "dump truck"),
    ("бортовой", "flatbed"),
    ("площадка", "flatbed"),
    ("цистерна", "tanker"),
    ("автовоз", "car carrier"),
    ("трал", "lowboy"),
    ("тент", "tent"),
    ("реф", "refrigerator"),
];

pub fn normalize(vehicle_type: &str) -> String {
    let mut normalized = vehicle_type.trim().to_lowercase();
    for &(alias, tag) in ALIASES {
        if normalized.contains(alias) {
            normalized = normalized.replace(alias, tag);
        }
    }
    normalized
}

pub fn is_capable(declared: &str, required: &str) -> bool {
    let declared = normalize(declared);
    let required = normalize(required);
    if declared.is_empty() || required.is_empty() {
        return false;
    }
    declared.contains(&required) || required.contains(&declared)
}
