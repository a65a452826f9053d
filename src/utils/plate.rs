//! Normalización de matrículas
//!
//! Convierte el texto OCR de la cámara en una clave canónica para deduplicar
//! matrículas: mayúsculas, sin espacios ni puntuación, y con las letras
//! cirílicas que tienen equivalente latino en las placas reemplazadas.

/// Normaliza una matrícula cruda.
///
/// Devuelve una cadena vacía si no queda ningún carácter alfanumérico;
/// quien llama decide si eso es un error.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .map(latin_lookalike)
        .collect()
}

fn latin_lookalike(c: char) -> char {
    match c {
        'А' => 'A',
        'В' => 'B',
        'Е' => 'E',
        'К' => 'K',
        'М' => 'M',
        'Н' => 'H',
        'О' => 'O',
        'Р' => 'P',
        'С' => 'C',
        'Т' => 'T',
        'У' => 'Y',
        'Х' => 'X',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_spaces_and_uppercases() {
        assert_eq!(normalize_plate("AB 123 CD"), "AB123CD");
        assert_eq!(normalize_plate("ab 123 cd"), "AB123CD");
        assert_eq!(normalize_plate("  Ab123cD\t"), "AB123CD");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize_plate("AB-123-CD"), "AB123CD");
        assert_eq!(normalize_plate("ab.123_cd"), "AB123CD");
    }

    #[test]
    fn test_cyrillic_lookalikes_map_to_latin() {
        // "А123ВС77" escrito con letras cirílicas
        assert_eq!(normalize_plate("а123вс 77"), "A123BC77");
        assert_eq!(normalize_plate("А123ВС77"), normalize_plate("A123BC77"));
    }

    #[test]
    fn test_empty_after_normalization() {
        assert_eq!(normalize_plate(""), "");
        assert_eq!(normalize_plate(" - . "), "");
    }

    #[test]
    fn test_is_idempotent() {
        let once = normalize_plate("xy 98-76 z");
        assert_eq!(normalize_plate(&once), once);
    }
}
