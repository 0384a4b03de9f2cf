use regex::Regex;
use std::sync::LazyLock;

/// Regex consolidada seguindo o padrão (?isx)
/// i: case-insensitive
/// x: modo verbose (ignora espaços e permite comentários)
pub static REGEX_PLANILHA_CALAMINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \.
        (?:
            xlsx | # Excel 2007+
            xlsm | # Excel com macros
            xlsb | # Excel binário
            xls  | # Excel 97-2003
            ods    # OpenDocument
        )
        $ # Fim da string
        ",
    )
    .unwrap()
});

pub static REGEX_PLANILHA_CSV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:csv|txt)$").unwrap());

// Regex para limpeza e validação
pub static RE_NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// Fatura composta apenas de dígitos e pontos, com ao menos um dígito.
pub static RE_FATURA_NUMERICA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.]*[0-9][0-9.]*$").unwrap());


/// Valor com ponto decimal opcional, sem separador de milhar: `1234`, `-1234.5`.
pub static RE_VALOR_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap());

/// Valor na notação brasileira: milhares com ponto e decimais com vírgula.
pub static RE_VALOR_BRASILEIRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^-?
        (?:
            \d{1,3}(?:\.\d{3})+ | # 1.234 ou 1.234.567
            \d+                   # 1234
        )
        (?:,\d+)?                 # ,50
        $
        ",
    )
    .unwrap()
});

/// Identificador numérico sem sinal nem expoente: `12345678000199` ou `12345678000199.0`.
pub static RE_IDENTIFICADOR_NUMERICO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d*)?$").unwrap());
