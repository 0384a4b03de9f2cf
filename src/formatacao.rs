use crate::{LinhaAgregada, RE_IDENTIFICADOR_NUMERICO};

/// Quantidade de dígitos do CPF.
pub const DIGITOS_CPF: usize = 11;

/// Quantidade de dígitos do CNPJ.
pub const DIGITOS_CNPJ: usize = 14;

/// Converte o identificador em inteiro, descartando a parte fracionária.
///
/// Só aceita dígitos com parte fracionária opcional: sinal e expoente ficam de fora.
fn coagir_inteiro(valor: &str) -> Option<u64> {
    let texto = valor.trim();

    if !RE_IDENTIFICADOR_NUMERICO.is_match(texto) {
        return None;
    }

    texto.parse::<u64>().ok().or_else(|| {
        texto
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0 && *n < 1e15)
            .map(|n| n.trunc() as u64)
    })
}

/// Formata o identificador como CPF (`000.000.000-00`) ou CNPJ (`00.000.000/0000-00`).
///
/// O valor é convertido em inteiro e completado com zeros à esquerda até 14 dígitos.
/// Se o inteiro, sem zeros à esquerda, tiver até 11 dígitos, é um CPF
/// (últimos 11 dígitos); senão, é um CNPJ.
///
/// Valores não numéricos, negativos ou com mais de 14 dígitos são devolvidos sem alteração.
///
/// ```
/// use conversor_de_mapas::formatar_identificador;
///
/// assert_eq!(formatar_identificador("12345678000199"), "12.345.678/0001-99");
/// assert_eq!(formatar_identificador("12345678901"), "123.456.789-01");
/// assert_eq!(formatar_identificador("00012345678901"), "123.456.789-01");
/// assert_eq!(formatar_identificador("2345678000199.0"), "02.345.678/0001-99");
/// assert_eq!(formatar_identificador("sem cadastro"), "sem cadastro");
/// ```
pub fn formatar_identificador(valor: &str) -> String {
    let Some(numero) = coagir_inteiro(valor) else {
        return valor.to_string();
    };

    let significativos = numero.to_string();
    if significativos.len() > DIGITOS_CNPJ {
        return valor.to_string();
    }

    let d = format!("{numero:014}");

    if significativos.len() <= DIGITOS_CPF {
        let cpf = &d[DIGITOS_CNPJ - DIGITOS_CPF..];
        format!("{}.{}.{}-{}", &cpf[..3], &cpf[3..6], &cpf[6..9], &cpf[9..])
    } else {
        format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        )
    }
}

/// Insere o separador de milhares '.' em uma sequência de dígitos.
fn separar_milhares(digitos: &str) -> String {
    let len = digitos.len();
    let mut result = String::with_capacity(len + len / 3);

    digitos.chars().enumerate().for_each(|(i, c)| {
        // Adiciona o ponto se:
        // 1. Não for o primeiro caractere (i > 0)
        // 2. A distância até o fim for múltipla de 3
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push('.');
        }
        result.push(c);
    });

    result
}

/// Formata contagens com separador de milhares.
///
/// ```
/// use conversor_de_mapas::fmt_milhares;
///
/// assert_eq!(fmt_milhares(1234567), "1.234.567");
/// assert_eq!(fmt_milhares(12), "12");
/// ```
pub fn fmt_milhares(n: usize) -> String {
    separar_milhares(&n.to_string())
}

/// Formata o valor em reais: duas casas decimais, '.' nos milhares e ',' nos centavos.
///
/// ```
/// use conversor_de_mapas::formatar_moeda;
///
/// assert_eq!(formatar_moeda(0.0), "R$ 0,00");
/// assert_eq!(formatar_moeda(1234.5), "R$ 1.234,50");
/// assert_eq!(formatar_moeda(1000000.0), "R$ 1.000.000,00");
/// assert_eq!(formatar_moeda(-75.0), "R$ -75,00");
/// ```
pub fn formatar_moeda(valor: f64) -> String {
    if !valor.is_finite() {
        return format!("R$ {valor}");
    }

    let texto = format!("{valor:.2}");
    let (sinal, absoluto) = match texto.strip_prefix('-') {
        Some(resto) => ("-", resto),
        None => ("", texto.as_str()),
    };
    let (inteiro, centavos) = absoluto.split_once('.').unwrap_or((absoluto, "00"));

    format!("R$ {sinal}{},{centavos}", separar_milhares(inteiro))
}

/// Linha do relatório com todos os campos já convertidos em texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinhaFormatada {
    pub nome: String,
    pub cnpj_cpf: String,
    pub plano_interno: String,
    pub fatura: String,
    pub valor: String,
}

impl LinhaFormatada {
    /// Campos na ordem de `COLUNAS_AGREGADAS`.
    pub fn campos(&self) -> [&str; 5] {
        [
            self.nome.as_str(),
            self.cnpj_cpf.as_str(),
            self.plano_interno.as_str(),
            self.fatura.as_str(),
            self.valor.as_str(),
        ]
    }
}

impl From<&LinhaAgregada> for LinhaFormatada {
    fn from(linha: &LinhaAgregada) -> Self {
        LinhaFormatada {
            nome: linha.nome.clone().unwrap_or_default(),
            cnpj_cpf: linha
                .identificador
                .as_deref()
                .map(formatar_identificador)
                .unwrap_or_default(),
            plano_interno: linha.plano_interno.clone(),
            fatura: linha.fatura.clone(),
            valor: formatar_moeda(linha.valor),
        }
    }
}

pub fn formatar_linhas(grupos: &[LinhaAgregada]) -> Vec<LinhaFormatada> {
    grupos.iter().map(LinhaFormatada::from).collect()
}
