use crate::logica::estados;
use crate::models::CotizacionCompleta;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::collections::HashMap;

// ============================================
// HELPERS
// ============================================

pub fn escapar_html(texto: &str) -> String {
    let mut salida = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => salida.push_str("&amp;"),
            '<' => salida.push_str("&lt;"),
            '>' => salida.push_str("&gt;"),
            '"' => salida.push_str("&quot;"),
            '\'' => salida.push_str("&#39;"),
            otro => salida.push(otro),
        }
    }
    salida
}

/// $12,345.60
pub fn formato_dinero(valor: f64) -> String {
    let centavos = (valor.abs() * 100.0).round() as u64;
    let enteros = (centavos / 100).to_string();
    let mut con_comas = String::new();
    for (i, c) in enteros.chars().enumerate() {
        if i > 0 && (enteros.len() - i) % 3 == 0 {
            con_comas.push(',');
        }
        con_comas.push(c);
    }
    let signo = if valor < 0.0 && centavos > 0 { "-" } else { "" };
    format!("{}${}.{:02}", signo, con_comas, centavos % 100)
}

fn format_cantidad(cant: f64) -> String {
    if cant == cant.floor() {
        format!("{:.0}", cant)
    } else {
        format!("{:.2}", cant)
    }
}

fn fecha_de(created_at: Option<&str>) -> Option<NaiveDate> {
    let texto = created_at?;
    NaiveDateTime::parse_from_str(texto, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(texto.get(..10).unwrap_or(texto), "%Y-%m-%d"))
        .ok()
}

fn valor_config<'a>(config: &'a HashMap<String, String>, key: &str) -> &'a str {
    config.get(key).map(|s| s.trim()).unwrap_or("")
}

fn fila_dato(salida: &mut String, etiqueta: &str, valor: Option<&str>) {
    if let Some(v) = valor.map(str::trim).filter(|v| !v.is_empty()) {
        salida.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            etiqueta,
            escapar_html(v)
        ));
    }
}

const ESTILOS: &str = "
body { font-family: Arial, Helvetica, sans-serif; color: #222; margin: 32px; }
header { display: flex; justify-content: space-between; align-items: flex-start; border-bottom: 3px solid #c0392b; padding-bottom: 12px; }
header img { max-height: 90px; max-width: 220px; }
h1 { margin: 0; font-size: 22px; }
.folio { text-align: right; }
.folio h2 { margin: 0; color: #c0392b; }
.bloques { display: flex; gap: 24px; margin: 18px 0; }
.bloques table { flex: 1; border-collapse: collapse; }
.bloques th { text-align: left; width: 120px; color: #555; font-weight: normal; }
table.conceptos { width: 100%; border-collapse: collapse; margin-top: 12px; }
table.conceptos th { background: #c0392b; color: #fff; padding: 6px; text-align: left; }
table.conceptos td { border-bottom: 1px solid #ddd; padding: 6px; }
.num { text-align: right; }
table.totales { margin-left: auto; margin-top: 12px; border-collapse: collapse; }
table.totales td { padding: 4px 8px; }
table.totales tr.total td { font-weight: bold; font-size: 16px; border-top: 2px solid #222; }
tr.saldo td { font-weight: bold; color: #c0392b; }
footer { margin-top: 32px; font-size: 12px; color: #666; }
";

// ============================================
// DOCUMENTO
// ============================================

/// Documento HTML completo de la cotización, listo para descargar o imprimir
/// desde el navegador.
pub fn generar_cotizacion_html(
    datos: &CotizacionCompleta,
    config: &HashMap<String, String>,
) -> String {
    let c = &datos.cotizacion;
    let mut html = String::with_capacity(8 * 1024);

    let nombre_negocio = match valor_config(config, "nombre_negocio") {
        "" => "MI TALLER",
        n => n,
    };

    html.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(&format!(
        "<title>Cotización {}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escapar_html(&c.folio),
        ESTILOS
    ));

    // Encabezado del negocio
    html.push_str("<header>\n<div>\n");
    let logo = valor_config(config, "logo_negocio");
    if !logo.is_empty() {
        let mime = if logo.starts_with("/9j/") { "image/jpeg" } else { "image/png" };
        html.push_str(&format!(
            "<img src=\"data:{};base64,{}\" alt=\"logo\">\n",
            mime,
            escapar_html(logo)
        ));
    }
    html.push_str(&format!("<h1>{}</h1>\n", escapar_html(nombre_negocio)));
    for (etiqueta, key) in [("RFC", "rfc"), ("", "direccion"), ("Tel.", "telefono"), ("", "email")] {
        let valor = valor_config(config, key);
        if !valor.is_empty() {
            if etiqueta.is_empty() {
                html.push_str(&format!("<div>{}</div>\n", escapar_html(valor)));
            } else {
                html.push_str(&format!("<div>{} {}</div>\n", etiqueta, escapar_html(valor)));
            }
        }
    }
    html.push_str("</div>\n");

    let emision = fecha_de(c.created_at.as_deref());
    let vigencia_dias: i64 = valor_config(config, "vigencia_dias").parse().unwrap_or(15);
    html.push_str("<div class=\"folio\">\n<h2>COTIZACIÓN</h2>\n");
    html.push_str(&format!("<div>Folio: <strong>{}</strong></div>\n", escapar_html(&c.folio)));
    if let Some(f) = emision {
        html.push_str(&format!("<div>Fecha: {}</div>\n", f.format("%d/%m/%Y")));
        if let Some(vence) = TimeDelta::try_days(vigencia_dias).and_then(|d| f.checked_add_signed(d)) {
            html.push_str(&format!("<div>Vigencia: {}</div>\n", vence.format("%d/%m/%Y")));
        }
    }
    html.push_str(&format!("<div>Estado: {}</div>\n", estados::etiqueta(&c.estado)));
    html.push_str("</div>\n</header>\n");

    // Cliente y vehículo
    html.push_str("<section class=\"bloques\">\n<table>\n");
    fila_dato(&mut html, "Cliente", c.cliente_nombre.as_deref());
    fila_dato(&mut html, "Teléfono", datos.cliente_telefono.as_deref());
    fila_dato(&mut html, "Correo", datos.cliente_email.as_deref());
    html.push_str("</table>\n<table>\n");
    fila_dato(&mut html, "Marca", c.vehiculo_marca.as_deref());
    fila_dato(&mut html, "Modelo", c.vehiculo_modelo.as_deref());
    let anio = c.vehiculo_anio.map(|a| a.to_string());
    fila_dato(&mut html, "Año", anio.as_deref());
    fila_dato(&mut html, "Placas", c.placas.as_deref());
    html.push_str("</table>\n</section>\n");

    if let Some(desc) = c.descripcion.as_deref().filter(|d| !d.trim().is_empty()) {
        html.push_str(&format!("<p>{}</p>\n", escapar_html(desc).replace('\n', "<br>")));
    }

    // Conceptos
    html.push_str(
        "<table class=\"conceptos\">\n<thead><tr><th>Cant.</th><th>Descripción</th>\
         <th class=\"num\">P. unitario</th><th class=\"num\">Importe</th></tr></thead>\n<tbody>\n",
    );
    for concepto in &datos.conceptos {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            format_cantidad(concepto.cantidad),
            escapar_html(&concepto.descripcion),
            formato_dinero(concepto.precio_unitario),
            formato_dinero(concepto.importe),
        ));
    }
    html.push_str("</tbody>\n</table>\n");

    // Totales y pagos
    let iva_pct = match valor_config(config, "iva_porcentaje") {
        "" => "16",
        p => p,
    };
    html.push_str("<table class=\"totales\">\n");
    html.push_str(&format!("<tr><td>Subtotal</td><td class=\"num\">{}</td></tr>\n", formato_dinero(c.subtotal)));
    html.push_str(&format!(
        "<tr><td>IVA {}%</td><td class=\"num\">{}</td></tr>\n",
        escapar_html(iva_pct),
        formato_dinero(c.iva)
    ));
    html.push_str(&format!(
        "<tr class=\"total\"><td>Total</td><td class=\"num\">{}</td></tr>\n",
        formato_dinero(c.total)
    ));
    for (etiqueta, monto) in [
        ("Anticipo", c.anticipo),
        ("Pago 1", c.pago1),
        ("Liquidación", c.liquidacion),
    ] {
        if monto > 0.0 {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">-{}</td></tr>\n",
                etiqueta,
                formato_dinero(monto)
            ));
        }
    }
    html.push_str(&format!(
        "<tr class=\"saldo\"><td>Saldo pendiente</td><td class=\"num\">{}</td></tr>\n",
        formato_dinero(c.saldo_pendiente)
    ));
    html.push_str("</table>\n");

    let nota = valor_config(config, "nota_cotizacion");
    html.push_str("<footer>\n");
    if let Some(notas) = c.notas.as_deref().filter(|n| !n.trim().is_empty()) {
        html.push_str(&format!("<p>{}</p>\n", escapar_html(notas)));
    }
    if !nota.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escapar_html(nota)));
    }
    html.push_str(&format!("<p>Vigencia de {} días a partir de la fecha de emisión.</p>\n", vigencia_dias));
    html.push_str("</footer>\n</body>\n</html>\n");

    html
}

/// Nombre sugerido para la descarga: `Cotizacion_COT-000012.html`
pub fn nombre_archivo(folio: &str) -> String {
    let limpio: String = folio
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("Cotizacion_{}.html", limpio)
}
