//! Extracción heurística de datos de un cliente a partir de una conversación
//! exportada de WhatsApp. No hay garantía de exactitud: el resultado se
//! muestra en un formulario para que recepción lo corrija antes de guardar.

use crate::logica::validacion::normalizar_telefono;
use crate::models::ResumenWhatsapp;
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

const MAX_RESUMEN_MENSAJE: usize = 160;

/// `[12/03/24, 10:15:22] Juan Pérez: texto` (exportación de iPhone)
static RE_IOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\u{200e}?\[(\d{1,2}/\d{1,2}/\d{2,4}),?\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s?[apAP]\.?\s?[mM]\.?)?)\]\s+([^:]+?):\s?(.*)$",
    )
    .expect("Invalid iOS header regex")
});

/// `12/03/2024 10:15 - Juan Pérez: texto` (exportación de Android)
static RE_ANDROID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2}/\d{1,2}/\d{2,4}),?\s+(\d{1,2}:\d{2}(?:\s?[apAP]\.?\s?[mM]\.?)?)\s+-\s+([^:]+?):\s?(.*)$",
    )
    .expect("Invalid Android header regex")
});

/// Encabezado con fecha pero sin remitente: avisos del sistema
static RE_SISTEMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\u{200e}?\[?\d{1,2}/\d{1,2}/\d{2,4},?\s+\d{1,2}:\d{2}").expect("Invalid system line regex")
});

static RE_PRESENTACION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[Mm]e llamo|[Mm]i nombre es|\b[Ss]oy)\s+(\p{Lu}\p{Ll}+(?:[ \t]+\p{Lu}\p{Ll}+){0,2})")
        .expect("Invalid introduction regex")
});

static RE_TELEFONO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?52[\s-]?)?(?:1[\s-]?)?\(?\d{2,3}\)?[\s.-]?\d{3,4}[\s.-]?\d{4}")
        .expect("Invalid phone regex")
});

static RE_ANIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[5-9]\d|20\d{2})\b").expect("Invalid year regex"));

static RE_PALABRA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}-]*").expect("Invalid word regex"));

/// (nombre canónico, formas en que la escriben)
const MARCAS: &[(&str, &[&str])] = &[
    ("Nissan", &["nissan"]),
    ("Chevrolet", &["chevrolet"]),
    ("Volkswagen", &["volkswagen", "vw"]),
    ("Toyota", &["toyota"]),
    ("Honda", &["honda"]),
    ("Mazda", &["mazda"]),
    ("Ford", &["ford"]),
    ("Kia", &["kia"]),
    ("Hyundai", &["hyundai"]),
    ("Dodge", &["dodge"]),
    ("Jeep", &["jeep"]),
    ("RAM", &["ram"]),
    ("Renault", &["renault"]),
    ("SEAT", &["seat"]),
    ("Audi", &["audi"]),
    ("BMW", &["bmw"]),
    ("Mercedes-Benz", &["mercedes", "mercedes-benz"]),
    ("Mitsubishi", &["mitsubishi"]),
    ("Suzuki", &["suzuki"]),
    ("Peugeot", &["peugeot"]),
    ("Fiat", &["fiat"]),
    ("Chrysler", &["chrysler"]),
    ("GMC", &["gmc"]),
    ("Buick", &["buick"]),
    ("Subaru", &["subaru"]),
    ("Volvo", &["volvo"]),
    ("MG", &["mg"]),
    ("JAC", &["jac"]),
    ("Chirey", &["chirey"]),
    ("Cadillac", &["cadillac"]),
    ("Lincoln", &["lincoln"]),
    ("Acura", &["acura"]),
    ("Infiniti", &["infiniti"]),
];

/// Palabras que siguen a la marca pero no son el modelo
const NO_MODELO: &[&str] = &[
    "de", "del", "modelo", "ano", "color", "con", "y", "que", "es", "mi", "un", "una", "el",
    "la", "le", "se", "tiene", "trae", "esta", "porque", "pero", "por", "para",
];

/// (servicio, raíces sin acentos que lo delatan)
const SERVICIOS: &[(&str, &[&str])] = &[
    ("Hojalatería", &["hojalateria", "abolladura", "abollad", "sumid", "golpe", "choque", "chocad"]),
    ("Pintura", &["pintura", "pintar", "repint", "rayon", "rayad", "raspon"]),
    ("Defensa/Fascia", &["defensa", "facia", "fascia"]),
    ("Salpicadera", &["salpicadera"]),
    ("Puerta", &["puerta"]),
    ("Cofre", &["cofre"]),
    ("Cajuela", &["cajuela"]),
    ("Pulido", &["pulido", "pulir", "encerado"]),
    ("Cristales", &["parabrisas", "cristal", "vidrio", "medallon"]),
    ("Faros/Calaveras", &["faro", "calavera"]),
    ("Espejo", &["espejo"]),
    ("Mecánica", &["mecanic", "afinacion", "motor"]),
    ("Frenos", &["freno", "balata"]),
    ("Suspensión", &["suspension", "amortiguador"]),
    ("Seguro", &["aseguradora", "siniestro", "deducible"]),
];

#[derive(Debug, Clone, PartialEq)]
struct Mensaje {
    remitente: Option<String>,
    texto: String,
}

fn separar_mensajes(chat: &str) -> Vec<Mensaje> {
    let mut mensajes: Vec<Mensaje> = Vec::new();

    for linea in chat.lines() {
        let linea = linea.trim_end();
        let captura = RE_IOS.captures(linea).or_else(|| RE_ANDROID.captures(linea));

        if let Some(caps) = captura {
            let remitente = caps[3].trim().trim_start_matches('~').trim().to_string();
            mensajes.push(Mensaje {
                remitente: Some(remitente),
                texto: caps[4].trim().to_string(),
            });
        } else if RE_SISTEMA.is_match(linea) {
            continue;
        } else if linea.trim().is_empty() {
            continue;
        } else if let Some(ultimo) = mensajes.last_mut() {
            if !ultimo.texto.is_empty() {
                ultimo.texto.push('\n');
            }
            ultimo.texto.push_str(linea.trim());
        } else {
            mensajes.push(Mensaje {
                remitente: None,
                texto: linea.trim().to_string(),
            });
        }
    }

    mensajes.retain(|m| !m.texto.is_empty() && !es_multimedia(&m.texto));
    mensajes
}

fn es_multimedia(texto: &str) -> bool {
    let t = texto.trim_start_matches('\u{200e}').trim();
    (t.starts_with('<') && t.ends_with('>')) || t == "null"
}

fn sin_acentos(texto: &str) -> String {
    texto
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            otro => otro,
        })
        .collect()
}

fn parece_telefono(texto: &str) -> bool {
    let digitos = texto.chars().filter(|c| c.is_ascii_digit()).count();
    digitos >= 10
        && texto
            .chars()
            .all(|c| c.is_ascii_digit() || " +-()".contains(c) || c == '\u{a0}')
}

fn buscar_telefono(texto: &str) -> Option<String> {
    RE_TELEFONO
        .find_iter(texto)
        .map(|m| normalizar_telefono(m.as_str()))
        .find(|t| t.len() == 10)
}

fn primera_mayuscula(palabra: &str) -> String {
    if palabra.chars().any(|c| c.is_uppercase()) {
        return palabra.to_string();
    }
    let mut chars = palabra.chars();
    match chars.next() {
        Some(p) => p.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn anio_valido(texto: &str) -> Option<i32> {
    let limite = chrono::Local::now().year() + 1;
    RE_ANIO
        .captures_iter(texto)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .find(|a| (1950..=limite).contains(a))
}

/// Marca, modelo y año del primer mensaje que menciona una marca conocida
fn buscar_vehiculo(mensajes: &[&Mensaje]) -> (Option<String>, Option<String>, Option<i32>) {
    for m in mensajes {
        let palabras: Vec<&str> = RE_PALABRA.find_iter(&m.texto).map(|p| p.as_str()).collect();

        for (i, palabra) in palabras.iter().enumerate() {
            let clave = sin_acentos(palabra);
            let marca = MARCAS
                .iter()
                .find(|(_, formas)| formas.contains(&clave.as_str()))
                .map(|(nombre, _)| nombre.to_string());

            if let Some(marca) = marca {
                let modelo = palabras[i + 1..]
                    .iter()
                    .find(|p| !NO_MODELO.contains(&sin_acentos(p).as_str()))
                    .filter(|p| !RE_ANIO.is_match(p) && p.chars().any(|c| c.is_alphabetic()))
                    .map(|p| primera_mayuscula(p));
                return (Some(marca), modelo, anio_valido(&m.texto));
            }
        }
    }
    (None, None, None)
}

fn buscar_servicios(texto: &str) -> Vec<String> {
    let normal = sin_acentos(texto);
    let mut encontrados: Vec<(usize, &str)> = SERVICIOS
        .iter()
        .filter_map(|(nombre, raices)| {
            raices
                .iter()
                .filter_map(|r| normal.find(r))
                .min()
                .map(|pos| (pos, *nombre))
        })
        .collect();
    encontrados.sort_by_key(|(pos, _)| *pos);
    encontrados.into_iter().map(|(_, n)| n.to_string()).collect()
}

fn truncar(texto: &str, max: usize) -> String {
    let plano = texto.split_whitespace().collect::<Vec<_>>().join(" ");
    if plano.chars().count() <= max {
        plano
    } else {
        let corto: String = plano.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", corto.trim_end())
    }
}

/// Analiza el texto de una conversación. `nombre_negocio` identifica los
/// mensajes enviados por el propio taller.
pub fn analizar_chat(chat: &str, nombre_negocio: Option<&str>) -> ResumenWhatsapp {
    let mensajes = separar_mensajes(chat);
    let negocio = nombre_negocio.map(sin_acentos).filter(|n| !n.is_empty());

    let es_del_taller = |m: &Mensaje| match (&m.remitente, &negocio) {
        (Some(r), Some(n)) => sin_acentos(r) == *n,
        _ => false,
    };

    let remitente_cliente: Option<String> = mensajes
        .iter()
        .filter(|m| !es_del_taller(m))
        .find_map(|m| m.remitente.clone());

    let del_cliente: Vec<&Mensaje> = mensajes
        .iter()
        .filter(|m| !es_del_taller(m))
        .filter(|m| m.remitente.is_none() || m.remitente == remitente_cliente)
        .collect();

    let texto_cliente = del_cliente
        .iter()
        .map(|m| m.texto.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let nombre = RE_PRESENTACION
        .captures(&texto_cliente)
        .map(|c| c[1].to_string())
        .or_else(|| {
            remitente_cliente
                .as_ref()
                .filter(|r| !parece_telefono(r))
                .cloned()
        });

    let telefono = buscar_telefono(&texto_cliente).or_else(|| {
        remitente_cliente
            .as_deref()
            .filter(|r| parece_telefono(r))
            .map(normalizar_telefono)
    });

    let (marca, modelo, anio_mensaje) = buscar_vehiculo(&del_cliente);
    let anio = anio_mensaje.or_else(|| marca.as_ref().and_then(|_| anio_valido(&texto_cliente)));

    let servicios = buscar_servicios(&texto_cliente);

    let mut resultado = ResumenWhatsapp {
        nombre,
        telefono,
        marca,
        modelo,
        anio,
        servicios,
        resumen: String::new(),
        mensajes: mensajes.len(),
    };

    let mut partes: Vec<String> = Vec::new();
    if !resultado.servicios.is_empty() {
        partes.push(format!("Servicios: {}", resultado.servicios.join(", ")));
    }
    if let Some(v) = resultado.vehiculo() {
        partes.push(format!("Vehículo: {}", v));
    }
    if let Some(primero) = del_cliente.first() {
        partes.push(format!("\"{}\"", truncar(&primero.texto, MAX_RESUMEN_MENSAJE)));
    }
    resultado.resumen = partes.join(". ");

    resultado
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_IPHONE: &str = "[12/03/24, 10:15:22] Taller El Güero: Buenos días, ¿en qué le podemos ayudar?
[12/03/24, 10:16:05] Juan Pérez: Hola, buen día. Soy Juan Pérez
[12/03/24, 10:16:40] Juan Pérez: Tengo un Nissan Versa 2018 con un golpe en la defensa trasera
y un rayón en la puerta
[12/03/24, 10:17:10] Taller El Güero: Claro, ¿nos comparte un teléfono?
[12/03/24, 10:18:00] Juan Pérez: 55 1234 5678";

    const CHAT_ANDROID: &str = "12/03/2024 9:02 - Los mensajes y las llamadas están cifrados de extremo a extremo.
12/03/2024 9:03 - +52 1 33 9876 5432: Buenas tardes, cuánto cuesta pintar el cofre de un vw jetta
12/03/2024 9:04 - +52 1 33 9876 5432: <Multimedia omitido>
12/03/2024 9:05 - Taller El Güero: Con gusto, ¿de qué año es?
12/03/2024 9:06 - +52 1 33 9876 5432: es 2015, me llamo Laura";

    #[test]
    fn extrae_datos_de_exportacion_iphone() {
        let r = analizar_chat(CHAT_IPHONE, Some("Taller El Güero"));
        assert_eq!(r.nombre.as_deref(), Some("Juan Pérez"));
        assert_eq!(r.telefono.as_deref(), Some("5512345678"));
        assert_eq!(r.marca.as_deref(), Some("Nissan"));
        assert_eq!(r.modelo.as_deref(), Some("Versa"));
        assert_eq!(r.anio, Some(2018));
        assert_eq!(
            r.servicios,
            vec!["Hojalatería", "Defensa/Fascia", "Pintura", "Puerta"]
        );
        assert_eq!(r.mensajes, 5);
        assert!(r.resumen.starts_with("Servicios: Hojalatería"));
        assert!(r.resumen.contains("Vehículo: Nissan Versa 2018"));
    }

    #[test]
    fn extrae_datos_de_exportacion_android() {
        let r = analizar_chat(CHAT_ANDROID, Some("taller el guero"));
        assert_eq!(r.nombre.as_deref(), Some("Laura"));
        assert_eq!(r.telefono.as_deref(), Some("3398765432"));
        assert_eq!(r.marca.as_deref(), Some("Volkswagen"));
        assert_eq!(r.modelo.as_deref(), Some("Jetta"));
        assert_eq!(r.anio, Some(2015));
        assert_eq!(r.servicios, vec!["Pintura", "Cofre"]);
        // aviso de cifrado y multimedia no cuentan
        assert_eq!(r.mensajes, 3);
    }

    #[test]
    fn texto_suelto_sin_encabezados() {
        let r = analizar_chat("mi nombre es Pedro, choqué mi Mazda 3 del 2020", None);
        assert_eq!(r.nombre.as_deref(), Some("Pedro"));
        assert_eq!(r.marca.as_deref(), Some("Mazda"));
        // "3" no tiene letras: no se toma como modelo
        assert_eq!(r.modelo, None);
        assert_eq!(r.anio, Some(2020));
        assert_eq!(r.servicios, vec!["Hojalatería"]);
        assert_eq!(r.mensajes, 1);
        assert_eq!(r.telefono, None);
    }

    #[test]
    fn conversacion_vacia() {
        let r = analizar_chat("", Some("Mi Taller"));
        assert_eq!(r, ResumenWhatsapp::default());
    }

    #[test]
    fn truncar_respeta_caracteres() {
        let largo = "ñ".repeat(200);
        let corto = truncar(&largo, 160);
        assert_eq!(corto.chars().count(), 160);
        assert!(corto.ends_with('…'));
    }
}
