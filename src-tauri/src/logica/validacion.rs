use crate::error::{Resultado, TallerError};

/// Deja solo dígitos y conserva los últimos 10 (quita lada +52 / 1)
pub fn normalizar_telefono(telefono: &str) -> String {
    let digitos: String = telefono.chars().filter(|c| c.is_ascii_digit()).collect();
    if digitos.len() > 10 {
        digitos[digitos.len() - 10..].to_string()
    } else {
        digitos
    }
}

/// Campo obligatorio: se recorta y no puede quedar vacío
pub fn requerido(valor: &str, campo: &str) -> Resultado<String> {
    let limpio = valor.trim();
    if limpio.is_empty() {
        return Err(TallerError::validacion(format!("{} es obligatorio", campo)));
    }
    Ok(limpio.to_string())
}

/// Cadenas vacías se guardan como NULL
pub fn opcional(valor: Option<String>) -> Option<String> {
    valor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validar_telefono(telefono: &str) -> Resultado<String> {
    let limpio = requerido(telefono, "El teléfono")?;
    let normalizado = normalizar_telefono(&limpio);
    if normalizado.len() < 7 {
        return Err(TallerError::validacion(format!(
            "El teléfono '{}' no es válido",
            limpio
        )));
    }
    Ok(limpio)
}

pub fn validar_anio(anio: Option<i64>) -> Resultado<()> {
    if let Some(a) = anio {
        if !(1900..=2100).contains(&a) {
            return Err(TallerError::validacion(format!("Año de vehículo inválido: {}", a)));
        }
    }
    Ok(())
}
