//! Chequeo ligero de formato Newick sobre árboles exportados.
//!
//! No es un parser: sólo detecta contenido claramente inválido (vacío,
//! paréntesis desbalanceados, sin `;` final).

/// `true` si el texto tiene la forma externa de un árbol Newick.
pub fn is_plausible_newick(text: &str) -> bool {
    let t = text.trim();
    if !t.starts_with('(') || !t.ends_with(';') {
        return false;
    }
    let mut depth: i64 = 0;
    let mut quoted = false;
    for c in t.chars() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_tool_output() {
        assert!(is_plausible_newick("(A:0.1,B:0.2,(C:0.3,D:0.4)0.95:0.5);\n"));
        assert!(is_plausible_newick("('E. coli':0.1,'S. enterica':0.2);"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_plausible_newick(""));
        assert!(!is_plausible_newick(">seq1\nMAQVIN"));
        assert!(!is_plausible_newick("(A,B;"));
        assert!(!is_plausible_newick("(A,B))(;"));
        assert!(!is_plausible_newick("(A,B)"));
    }
}
