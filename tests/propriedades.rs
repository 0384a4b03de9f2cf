use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use conversor_de_mapas::{
    LinhaInex, LinhaMapa, RE_NON_DIGITS, TabelaInex, agrupar, enriquecer, formatar_identificador,
    formatar_linhas, resolver_identificador,
};

fn linha_mapa() -> impl Strategy<Value = LinhaMapa> {
    (
        prop::sample::select(vec!["A", "B", "C"]),
        prop::option::of(prop::sample::select(vec![
            "12345678000199",
            "11111111000111",
            "0",
            "0.0",
            "nan",
            "",
            " ",
        ])),
        prop::option::of(prop::sample::select(vec!["12345678901", "98765432100"])),
        prop::sample::select(vec!["P1", "P2", "P3"]),
        prop::option::of(prop::sample::select(vec!["100", "100.0", "NF-1", "2024/7"])),
        // Múltiplos de 0,25 são exatos em ponto flutuante
        -4000i32..4000,
    )
        .prop_map(|(nome, cnpj, cpf, plano, fatura, quartos)| LinhaMapa {
            nome: Some(nome.to_string()),
            cnpj: cnpj.map(String::from),
            cpf: cpf.map(String::from),
            plano_interno: plano.to_string(),
            fatura: fatura.map(String::from),
            valor: f64::from(quartos) / 4.0,
        })
}

fn totais(linhas: &[LinhaMapa]) -> HashMap<(Option<String>, String), f64> {
    agrupar(linhas)
        .into_iter()
        .map(|g| ((g.identificador, g.plano_interno), g.valor))
        .collect()
}

proptest! {
    #[test]
    fn cnpj_valido_prevalece_sobre_cpf(linha in linha_mapa()) {
        let esperado = match linha.cnpj.as_deref() {
            Some(cnpj) if !["nan", "0", "0.0", "", " "].contains(&cnpj) => Some(cnpj),
            _ => linha.cpf.as_deref(),
        };
        prop_assert_eq!(resolver_identificador(linha.cnpj.as_deref(), linha.cpf.as_deref()), esperado);
    }

    #[test]
    fn agrupamento_eh_particao(linhas in prop::collection::vec(linha_mapa(), 0..40)) {
        let grupos = agrupar(&linhas);

        let total: usize = grupos.iter().map(|g| g.quantidade_de_linhas).sum();
        prop_assert_eq!(total, linhas.len());

        let chaves: HashSet<_> = grupos
            .iter()
            .map(|g| (g.identificador.clone(), g.plano_interno.clone()))
            .collect();
        prop_assert_eq!(chaves.len(), grupos.len());

        for linha in &linhas {
            let chave = (linha.identificador().map(String::from), linha.plano_interno.clone());
            prop_assert!(chaves.contains(&chave));
        }
    }

    #[test]
    fn soma_independe_da_ordem(
        (linhas, embaralhadas) in prop::collection::vec(linha_mapa(), 0..40)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        prop_assert_eq!(totais(&linhas), totais(&embaralhadas));
    }

    #[test]
    fn fatura_repetida_nao_altera_o_resultado(
        linhas in prop::collection::vec(linha_mapa(), 1..20),
        idx in any::<prop::sample::Index>(),
    ) {
        let mut com_repeticao = linhas.clone();
        let repetida = com_repeticao[idx.index(linhas.len())].clone();
        com_repeticao.push(LinhaMapa { valor: 0.0, ..repetida });

        let faturas = |linhas: &[LinhaMapa]| -> Vec<String> {
            agrupar(linhas).into_iter().map(|g| g.fatura).collect()
        };
        prop_assert_eq!(faturas(&linhas), faturas(&com_repeticao));
    }

    #[test]
    fn formatacao_preserva_os_digitos(numero in 0u64..100_000_000_000_000) {
        let preenchido = format!("{numero:014}");
        let formatado = formatar_identificador(&numero.to_string());
        let digitos = RE_NON_DIGITS.replace_all(&formatado, "");

        if numero.to_string().len() <= 11 {
            prop_assert_eq!(formatado.len(), 14);
            prop_assert_eq!(&digitos[..], &preenchido[3..]);
        } else {
            prop_assert_eq!(formatado.len(), 18);
            prop_assert_eq!(&digitos[..], &preenchido[..]);
        }
    }

    #[test]
    fn enriquecimento_preserva_o_numero_de_linhas(
        linhas in prop::collection::vec(linha_mapa(), 0..30),
        referencias in prop::collection::vec(
            prop::sample::select(vec!["12345678000199", "11111111000111", "12345678901", ""]),
            0..6,
        ),
    ) {
        let grupos = agrupar(&linhas);
        let inex = TabelaInex {
            colunas_extras: vec![],
            linhas: referencias
                .iter()
                .map(|cnpj| LinhaInex {
                    cnpj: cnpj.to_string(),
                    item: String::new(),
                    inex: "IX".into(),
                    extras: vec![],
                })
                .collect(),
        };

        let relatorio = enriquecer(formatar_linhas(&grupos), &inex);
        prop_assert_eq!(relatorio.linhas.len(), grupos.len());

        for linha in relatorio.linhas.iter().filter(|l| !l.encontrada) {
            prop_assert_eq!(linha.inex.as_str(), "");
        }
    }
}
