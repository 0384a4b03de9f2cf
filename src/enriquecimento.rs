use log::{debug, warn};
use std::collections::HashMap;

use crate::{LinhaFormatada, LinhaInex, LinhaRelatorio, RE_NON_DIGITS, Relatorio, TabelaInex};

/// Chave de junção com a tabela INEX: somente dígitos, completados com zeros até 14.
///
/// Um CPF formatado vira uma chave de 14 dígitos iniciada por "000",
/// que normalmente não encontra correspondência numa tabela de CNPJs.
///
/// ```
/// use conversor_de_mapas::chave_de_juncao;
///
/// assert_eq!(chave_de_juncao("12.345.678/0001-99"), "12345678000199");
/// assert_eq!(chave_de_juncao("123.456.789-01"), "00012345678901");
/// ```
pub fn chave_de_juncao(identificador: &str) -> String {
    let digitos = RE_NON_DIGITS.replace_all(identificador, "");
    format!("{digitos:0>14}")
}

/// Índice da tabela INEX pela chave de junção.
///
/// Linhas cujo CNPJ não tem dígito diferente de zero são descartadas: a chave
/// `00000000000000` é a mesma dos grupos sem identificador.
/// Em chaves repetidas, prevalece a primeira linha.
fn indexar_inex(inex: &TabelaInex) -> HashMap<String, &LinhaInex> {
    let mut indice: HashMap<String, &LinhaInex> = HashMap::with_capacity(inex.linhas.len());

    for linha in &inex.linhas {
        let chave = chave_de_juncao(&linha.cnpj);

        if chave.bytes().all(|b| b == b'0') {
            debug!("Linha INEX sem CNPJ ignorada: {linha:?}");
            continue;
        }

        if indice.contains_key(&chave) {
            warn!("CNPJ repetido na tabela INEX: {chave} (mantida a primeira ocorrência)");
        } else {
            indice.insert(chave, linha);
        }
    }

    indice
}

/// Junção à esquerda das linhas formatadas com a tabela INEX.
///
/// O número de linhas do relatório é sempre igual ao número de linhas recebidas.
/// Linhas sem correspondência ficam com ITEM, INEX e colunas extras em branco.
pub fn enriquecer(linhas: Vec<LinhaFormatada>, inex: &TabelaInex) -> Relatorio {
    let indice = indexar_inex(inex);
    let num_extras = inex.colunas_extras.len();

    let linhas: Vec<LinhaRelatorio> = linhas
        .into_iter()
        .map(|dados| match indice.get(&chave_de_juncao(&dados.cnpj_cpf)) {
            Some(referencia) => LinhaRelatorio {
                item: referencia.item.clone(),
                inex: referencia.inex.clone(),
                extras: referencia.extras.clone(),
                encontrada: true,
                dados,
            },
            None => LinhaRelatorio {
                item: String::new(),
                inex: String::new(),
                extras: vec![String::new(); num_extras],
                encontrada: false,
                dados,
            },
        })
        .collect();

    debug!(
        "Enriquecimento: {} de {} linhas com correspondência na tabela INEX",
        linhas.iter().filter(|l| l.encontrada).count(),
        linhas.len()
    );

    Relatorio {
        colunas_extras: Some(inex.colunas_extras.clone()),
        linhas,
    }
}
