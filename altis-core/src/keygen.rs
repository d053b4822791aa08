use uuid::Uuid;

/// Mints globally unique record identifiers
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 uuid per call
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
