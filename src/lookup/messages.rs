use std::borrow::Cow;

/// Texts shown by a lookup widget, Portuguese by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMessages {
    pub error_loading: Cow<'static, str>,
    pub loading_more: Cow<'static, str>,
    pub no_results: Cow<'static, str>,
    pub searching: Cow<'static, str>,
    pub remove_all_items: Cow<'static, str>,
}

impl Default for LookupMessages {
    fn default() -> Self {
        Self {
            error_loading: Cow::Borrowed("Erro ao carregar os resultados."),
            loading_more: Cow::Borrowed("Carregando mais resultados…"),
            no_results: Cow::Borrowed("Nenhum resultado encontrado."),
            searching: Cow::Borrowed("Buscando…"),
            remove_all_items: Cow::Borrowed("Limpar seleção"),
        }
    }
}

impl LookupMessages {
    pub fn input_too_short(&self, minimum: usize) -> String {
        format!("Digite pelo menos {minimum} caractere(s)…")
    }
}
