use crate::error::{Resultado, TallerError};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Genera un salt aleatorio de 16 caracteres hexadecimales
pub fn generar_salt() -> String {
    let mut rng = rand::thread_rng();
    let salt: u64 = rng.gen();
    format!("{:016x}", salt)
}

/// SHA-256 de salt + PIN en hexadecimal
pub fn hash_pin(salt: &str, pin: &str) -> String {
    let hash = Sha256::digest(format!("{}{}", salt, pin).as_bytes());
    format!("{:x}", hash)
}

pub fn verificar(salt: &str, pin: &str, hash: &str) -> bool {
    hash_pin(salt, pin) == hash
}

/// Solo 4 a 6 dígitos
pub fn validar(pin: &str) -> Resultado<()> {
    if !(4..=6).contains(&pin.len()) || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(TallerError::validacion(
            "El PIN debe tener 4 a 6 dígitos numéricos",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_depende_del_salt() {
        let a = generar_salt();
        let b = generar_salt();
        assert_eq!(a.len(), 16);
        assert_ne!(hash_pin(&a, "1234"), hash_pin(&b, "1234"));
        assert!(verificar(&a, "1234", &hash_pin(&a, "1234")));
        assert!(!verificar(&a, "4321", &hash_pin(&a, "1234")));
    }

    #[test]
    fn formato_del_pin() {
        assert!(validar("0000").is_ok());
        assert!(validar("123456").is_ok());
        assert!(validar("123").is_err());
        assert!(validar("1234567").is_err());
        assert!(validar("12a4").is_err());
    }
}
