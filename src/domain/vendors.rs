use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vendor line of business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VendorCategory {
    Goods,
    Services,
}

impl VendorCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "goods" => Some(Self::Goods),
            "services" => Some(Self::Services),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goods => "goods",
            Self::Services => "services",
        }
    }
}

/// Vendor entity as held by the store. The password hash never leaves the
/// backend; responses go through [`VendorResponse`].
#[derive(Debug, Clone)]
pub struct Vendor {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub kra_pin: String,
    pub company_name: String,
    pub phone_number: String,
    pub category: VendorCategory,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new vendor. Email and PIN are already normalized
/// (lowercase / uppercase) by validation.
#[derive(Debug, Clone)]
pub struct NewVendor {
    pub email: String,
    pub password_hash: String,
    pub kra_pin: String,
    pub company_name: String,
    pub phone_number: String,
    pub category: VendorCategory,
}

/// Request DTO for vendor registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub kra_pin: String,
    pub company_name: String,
    pub phone_number: String,
    pub category: String,
}

/// Registration input after normalization and validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub email: String,
    pub password: String,
    pub kra_pin: String,
    pub company_name: String,
    pub phone_number: String,
    pub category: VendorCategory,
}

impl RegisterRequest {
    /// Normalize and validate the registration payload. Collects every
    /// problem rather than stopping at the first.
    pub fn validate(&self) -> Result<ValidRegistration, Vec<String>> {
        let email = self.email.trim().to_lowercase();
        let kra_pin = self.kra_pin.trim().to_uppercase();
        let company_name = self.company_name.trim().to_string();
        let phone_number = self.phone_number.trim().to_string();

        let mut problems = Vec::new();
        if !valid_email(&email) {
            problems.push("email must be a valid address".to_string());
        }
        if self.password.len() < 8 {
            problems.push("password must be at least 8 characters".to_string());
        }
        if !valid_kra_pin(&kra_pin) {
            problems.push("kra_pin must be a letter, nine digits, then a letter".to_string());
        }
        if company_name.is_empty() {
            problems.push("company_name must not be empty".to_string());
        }
        if !valid_phone(&phone_number) {
            problems.push("phone_number must be +254 followed by nine digits".to_string());
        }
        let category = VendorCategory::parse(&self.category);
        if category.is_none() {
            problems.push("category must be either \"goods\" or \"services\"".to_string());
        }

        match (category, problems.is_empty()) {
            (Some(category), true) => Ok(ValidRegistration {
                email,
                password: self.password.clone(),
                kra_pin,
                company_name,
                phone_number,
                category,
            }),
            _ => Err(problems),
        }
    }
}

/// Request DTO for login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request DTO for profile updates. Only the mutable profile fields are
/// accepted; everything else on a vendor is fixed at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        if let Some(name) = &self.company_name {
            if name.trim().is_empty() {
                problems.push("company_name must not be empty".to_string());
            }
        }
        if let Some(phone) = &self.phone_number {
            if !valid_phone(phone.trim()) {
                problems.push("phone_number must be +254 followed by nine digits".to_string());
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Response DTO for vendor data. Never carries the password hash or the
/// blacklist flag.
#[derive(Debug, Clone, Serialize)]
pub struct VendorResponse {
    pub id: Uuid,
    pub email: String,
    pub kra_pin: String,
    pub company_name: String,
    pub phone_number: String,
    pub category: VendorCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vendor> for VendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            email: v.email,
            kra_pin: v.kra_pin,
            company_name: v.company_name,
            phone_number: v.phone_number,
            category: v.category,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Response DTO for register/login: a bearer token plus the vendor record.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub vendor: VendorResponse,
}

fn valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

/// KRA PIN: one letter, nine digits, one letter. Callers uppercase first.
fn valid_kra_pin(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 11
        && bytes[0].is_ascii_uppercase()
        && bytes[10].is_ascii_uppercase()
        && bytes[1..10].iter().all(u8::is_ascii_digit)
}

/// Kenyan MSISDN: +254 followed by nine digits.
fn valid_phone(s: &str) -> bool {
    match s.strip_prefix("+254") {
        Some(rest) => rest.len() == 9 && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
