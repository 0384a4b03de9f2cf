use std::collections::HashMap;
use std::sync::LazyLock;

// --- Tabelas de Referência ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoDeArquivo {
    /// Mapa de execução orçamentária (arquivo principal)
    Mapa,
    /// Tabela de referência INEX (enriquecimento opcional)
    Inex,
}

/// Valores de CNPJ tratados como ausentes.
///
/// Inclui as representações textuais de células vazias ou zeradas
/// que aparecem nas exportações do sistema de origem.
pub const SENTINELAS_AUSENTES: [&str; 5] = ["nan", "0", "0.0", "", " "];

/// Verifica se o texto de um CNPJ deve ser tratado como ausente.
///
/// ```
/// use conversor_de_mapas::eh_sentinela;
///
/// assert!(eh_sentinela("0.0"));
/// assert!(eh_sentinela(" "));
/// assert!(!eh_sentinela("  "));
/// assert!(!eh_sentinela("12345678000199"));
/// ```
pub fn eh_sentinela(texto: &str) -> bool {
    SENTINELAS_AUSENTES.contains(&texto)
}

// Nomes das colunas do relatório
pub const COLUNA_NOME: &str = "Nome";
pub const COLUNA_CNPJ_CPF: &str = "CNPJ/CPF";
pub const COLUNA_PLANO_INTERNO: &str = "Plano Interno";
pub const COLUNA_FATURA: &str = "Fatura";
pub const COLUNA_VALOR: &str = "Valor";
pub const COLUNA_ITEM: &str = "ITEM";
pub const COLUNA_INEX: &str = "INEX";

/// Ordem fixa das colunas agregadas.
pub const COLUNAS_AGREGADAS: [&str; 5] = [
    COLUNA_NOME,
    COLUNA_CNPJ_CPF,
    COLUNA_PLANO_INTERNO,
    COLUNA_FATURA,
    COLUNA_VALOR,
];

// Mapeamento estático para colunas do Mapa (campo interno -> cabeçalho da planilha)
pub static COLUNAS_MAPA: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("nome", "Nome"),
        ("cnpj", "CNPJ"),
        ("cpf", "CPF"),
        ("plano_interno", "Plano Interno"),
        ("fatura", "Fatura"),
        ("valor", "Valor"),
    ])
});

// Mapeamento estático para colunas essenciais da tabela INEX.
// A coluna ITEM é opcional e tratada à parte.
pub static COLUNAS_INEX: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([("cnpj", "CNPJ"), ("inex", COLUNA_INEX)])
});

/// Retorna o mapeamento de colunas essenciais de cada tipo de arquivo.
pub fn colunas_essenciais(tipo: TipoDeArquivo) -> &'static HashMap<&'static str, &'static str> {
    match tipo {
        TipoDeArquivo::Mapa => &COLUNAS_MAPA,
        TipoDeArquivo::Inex => &COLUNAS_INEX,
    }
}
