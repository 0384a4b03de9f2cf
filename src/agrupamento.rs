use log::debug;
use std::collections::{HashMap, HashSet};

use crate::{LinhaMapa, RE_FATURA_NUMERICA};

/// Resultado da agregação de um grupo (identificador, plano interno).
#[derive(Debug, Clone, PartialEq)]
pub struct LinhaAgregada {
    /// Primeiro nome não nulo encontrado, na ordem das linhas do mapa.
    pub nome: Option<String>,
    pub identificador: Option<String>,
    pub plano_interno: String,
    /// Faturas distintas, já normalizadas e unidas por ", ".
    pub fatura: String,
    pub valor: f64,
    /// Número de linhas do mapa que compõem o grupo.
    pub quantidade_de_linhas: usize,
}

/// Remove o artefato `.0` de faturas numéricas.
///
/// Se a fatura contiver apenas dígitos e pontos, retorna a parte anterior
/// ao primeiro ponto; caso contrário, retorna o texto original.
///
/// ```
/// use conversor_de_mapas::normalizar_fatura;
///
/// assert_eq!(normalizar_fatura("100.0"), "100");
/// assert_eq!(normalizar_fatura("2024NE000123"), "2024NE000123");
/// assert_eq!(normalizar_fatura("12/2024"), "12/2024");
/// ```
pub fn normalizar_fatura(fatura: &str) -> &str {
    if RE_FATURA_NUMERICA.is_match(fatura) {
        fatura.split('.').next().unwrap_or(fatura)
    } else {
        fatura
    }
}

/// Une as faturas distintas, na ordem da primeira ocorrência.
///
/// A distinção é feita sobre o texto original, antes da normalização.
///
/// ```
/// use conversor_de_mapas::juntar_faturas;
///
/// assert_eq!(juntar_faturas(["100.0", "200", "100.0", "NF-7"]), "100, 200, NF-7");
/// ```
pub fn juntar_faturas<'a, I>(faturas: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut vistas = HashSet::new();

    faturas
        .into_iter()
        .filter(|fatura| vistas.insert(*fatura))
        .map(normalizar_fatura)
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Acumulador interno de um grupo, preenchido na ordem das linhas.
struct Grupo<'a> {
    nome: Option<&'a str>,
    faturas: Vec<&'a str>,
    valor: f64,
    quantidade_de_linhas: usize,
}

/// Particiona as linhas por (identificador, plano interno) e agrega cada grupo.
///
/// Os grupos são devolvidos na ordem em que a chave aparece pela primeira vez.
/// Linhas sem identificador formam um grupo próprio por plano interno.
///
/// ### Exemplo
/// ```
/// use conversor_de_mapas::{LinhaMapa, agrupar};
///
/// let linha = |fatura: &str, valor: f64| LinhaMapa {
///     nome: Some("A".to_string()),
///     cnpj: Some("12345678000199".to_string()),
///     cpf: None,
///     plano_interno: "P1".to_string(),
///     fatura: Some(fatura.to_string()),
///     valor,
/// };
///
/// let grupos = agrupar(&[linha("100.0", 50.0), linha("100.0", 25.0)]);
///
/// assert_eq!(grupos.len(), 1);
/// assert_eq!(grupos[0].fatura, "100");
/// assert_eq!(grupos[0].valor, 75.0);
/// ```
pub fn agrupar(linhas: &[LinhaMapa]) -> Vec<LinhaAgregada> {
    let mut posicoes: HashMap<(Option<&str>, &str), usize> = HashMap::new();
    let mut chaves: Vec<(Option<&str>, &str)> = Vec::new();
    let mut grupos: Vec<Grupo> = Vec::new();

    for linha in linhas {
        let chave = (linha.identificador(), linha.plano_interno.as_str());

        let idx = *posicoes.entry(chave).or_insert_with(|| {
            chaves.push(chave);
            grupos.push(Grupo {
                nome: None,
                faturas: Vec::new(),
                valor: 0.0,
                quantidade_de_linhas: 0,
            });
            grupos.len() - 1
        });

        let grupo = &mut grupos[idx];
        if grupo.nome.is_none() {
            grupo.nome = linha.nome.as_deref();
        }
        if let Some(fatura) = linha.fatura.as_deref() {
            grupo.faturas.push(fatura);
        }
        grupo.valor += linha.valor;
        grupo.quantidade_de_linhas += 1;
    }

    debug!("{} linhas agrupadas em {} grupos", linhas.len(), grupos.len());

    chaves
        .into_iter()
        .zip(grupos)
        .map(|((identificador, plano_interno), grupo)| LinhaAgregada {
            nome: grupo.nome.map(String::from),
            identificador: identificador.map(String::from),
            plano_interno: plano_interno.to_string(),
            fatura: juntar_faturas(grupo.faturas),
            valor: grupo.valor,
            quantidade_de_linhas: grupo.quantidade_de_linhas,
        })
        .collect()
}
