use chrono::{Datelike, Utc};

/// Field checks run before a request leaves the daemon. The backend validates
/// again; these exist so obviously bad input fails fast with a field name.

pub fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && !tld.is_empty()
        && !domain.contains('@')
        && !domain.contains(char::is_whitespace)
}

pub fn valid_roll_no(roll_no: &str) -> bool {
    !roll_no.is_empty() && roll_no.chars().all(|c| c.is_ascii_digit())
}

pub fn valid_faculty_id(faculty_id: &str) -> bool {
    !faculty_id.is_empty() && faculty_id.chars().all(|c| c.is_ascii_digit())
}

pub fn valid_course_id(course_id: &str) -> bool {
    !course_id.is_empty() && course_id.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn valid_batch_year(year: i32) -> bool {
    let current = Utc::now().year();
    (2000..=current + 5).contains(&year)
}

pub fn valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

pub fn valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ')
}

/// At least 8 characters with one uppercase, one lowercase and one digit.
pub fn valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn valid_file_size(size: u64, max_size: u64) -> bool {
    size <= max_size
}

pub fn valid_file_type(content_type: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|a| a == content_type)
}
