use calamine::{Data, Reader, open_workbook_auto};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::{
    fs,
    path::{Path, PathBuf},
};

use conversor_de_mapas::{FormatoDeSaida, MapaError, PedidoDeConversao, converter};

enum Valor {
    Texto(&'static str),
    Numero(f64),
    Vazio,
}

use Valor::{Numero, Texto, Vazio};

const CABECALHO_MAPA: [&str; 6] = ["Nome", "CNPJ", "CPF", "Plano Interno", "Fatura", "Valor"];

fn escrever_xlsx(path: &Path, cabecalho: &[&str], linhas: Vec<Vec<Valor>>) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in cabecalho.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (row_idx, linha) in linhas.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, valor) in linha.iter().enumerate() {
            let col = col as u16;
            match valor {
                Texto(s) => {
                    worksheet.write_string(row, col, *s).unwrap();
                }
                Numero(n) => {
                    worksheet.write_number(row, col, *n).unwrap();
                }
                Vazio => {}
            }
        }
    }

    workbook.save(path).unwrap();
}

fn ler_xlsx(path: &Path) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range("Relatorio").unwrap();

    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn pedido(mapa: PathBuf, inex: Option<PathBuf>, destino: &Path) -> PedidoDeConversao {
    PedidoDeConversao {
        arquivo_mapa: mapa,
        arquivo_inex: inex,
        pasta_destino: destino.to_path_buf(),
        formato: FormatoDeSaida::Xlsx,
        com_timestamp: false,
    }
}

fn mapa_padrao(path: &Path) {
    escrever_xlsx(
        path,
        &CABECALHO_MAPA,
        vec![
            vec![Texto("A"), Texto("12345678000199"), Vazio, Texto("P1"), Texto("100.0"), Numero(50.0)],
            vec![Texto("A"), Texto("12345678000199"), Vazio, Texto("P1"), Texto("100.0"), Numero(25.0)],
            vec![Texto("B"), Texto("0"), Texto("12345678901"), Texto("P2"), Numero(7.0), Numero(1234.5)],
            vec![Texto("C"), Numero(2345678000199.0), Vazio, Texto("P1"), Texto("NF-9"), Texto("1.000,00")],
        ],
    );
}

#[test]
fn converte_mapa_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    mapa_padrao(&mapa);

    let resumo = converter(&pedido(mapa, None, dir.path())).unwrap();

    assert_eq!(resumo.arquivo_gerado, dir.path().join("relatorio_por_cnpj.xlsx"));
    assert_eq!(resumo.linhas_lidas, 4);
    assert_eq!(resumo.grupos, 3);
    assert_eq!(resumo.valor_total, 2309.5);
    assert_eq!(resumo.grupos_enriquecidos, None);

    assert_eq!(
        ler_xlsx(&resumo.arquivo_gerado),
        vec![
            vec!["Nome", "CNPJ/CPF", "Plano Interno", "Fatura", "Valor"],
            vec!["A", "12.345.678/0001-99", "P1", "100", "R$ 75,00"],
            vec!["B", "123.456.789-01", "P2", "7", "R$ 1.234,50"],
            vec!["C", "02.345.678/0001-99", "P1", "NF-9", "R$ 1.000,00"],
        ]
    );
}

#[test]
fn enriquece_com_tabela_inex() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    mapa_padrao(&mapa);

    let inex = dir.path().join("inex.xlsx");
    escrever_xlsx(
        &inex,
        &["CNPJ", "Observação", "INEX", "ITEM"],
        vec![
            vec![Texto("12345678000199"), Texto("ativo"), Texto("IX-01"), Numero(3.0)],
            vec![Texto("00012345678901"), Vazio, Texto("IX-CPF"), Numero(4.0)],
        ],
    );

    let resumo = converter(&pedido(mapa, Some(inex), dir.path())).unwrap();
    assert_eq!(resumo.grupos_enriquecidos, Some(2));

    assert_eq!(
        ler_xlsx(&resumo.arquivo_gerado),
        vec![
            vec!["ITEM", "INEX", "Nome", "CNPJ/CPF", "Plano Interno", "Fatura", "Valor", "Observação"],
            vec!["3", "IX-01", "A", "12.345.678/0001-99", "P1", "100", "R$ 75,00", "ativo"],
            vec!["4", "IX-CPF", "B", "123.456.789-01", "P2", "7", "R$ 1.234,50", ""],
            vec!["", "", "C", "02.345.678/0001-99", "P1", "NF-9", "R$ 1.000,00", ""],
        ]
    );
}

#[test]
fn tabela_inex_sem_item() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    mapa_padrao(&mapa);

    let inex = dir.path().join("inex.xlsx");
    escrever_xlsx(
        &inex,
        &["CNPJ", "INEX"],
        vec![vec![Texto("02345678000199"), Texto("IX-02")]],
    );

    let resumo = converter(&pedido(mapa, Some(inex), dir.path())).unwrap();
    let linhas = ler_xlsx(&resumo.arquivo_gerado);

    assert_eq!(linhas[0][..2].to_vec(), vec!["ITEM", "INEX"]);
    assert_eq!(linhas.len(), 4);
    assert_eq!(linhas[3][..3].to_vec(), vec!["", "IX-02", "C"]);
}

#[test]
fn valor_invalido_nao_gera_arquivo() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    escrever_xlsx(
        &mapa,
        &CABECALHO_MAPA,
        vec![
            vec![Texto("A"), Texto("1"), Vazio, Texto("P1"), Texto("1"), Numero(1.0)],
            vec![Texto("A"), Texto("1"), Vazio, Texto("P1"), Texto("2"), Texto("cinquenta")],
        ],
    );

    let destino = dir.path().join("saida");
    fs::create_dir(&destino).unwrap();

    match converter(&pedido(mapa, None, &destino)) {
        Err(MapaError::ValorInvalido { linha, valor, .. }) => {
            assert_eq!(linha, 3);
            assert_eq!(valor, "cinquenta");
        }
        other => panic!("esperado ValorInvalido, obtido {other:?}"),
    }

    assert_eq!(fs::read_dir(&destino).unwrap().count(), 0);
}

#[test]
fn mapa_sem_coluna_essencial() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    escrever_xlsx(&mapa, &["Nome", "CNPJ", "Plano Interno", "Fatura", "Valor"], vec![]);

    let err = converter(&pedido(mapa, None, dir.path())).unwrap_err();
    assert!(matches!(err, MapaError::MissingEssentialColumn { ref coluna, .. } if coluna == "CPF"));
}

#[test]
fn converte_mapa_csv_para_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.csv");
    fs::write(
        &mapa,
        "Nome;CNPJ;CPF;Plano Interno;Fatura;Valor\n\
         Fulano;nan;98765432100;PI-7;55.0;10,50\n\
         Fulano;;98765432100;PI-7;56;\"1.000,00\"\n\
         Fulano;;98765432100;PI-7;55.0;0,50\n",
    )
    .unwrap();

    let mut pedido = pedido(mapa, None, dir.path());
    pedido.formato = FormatoDeSaida::Csv;

    let resumo = converter(&pedido).unwrap();

    assert_eq!(resumo.arquivo_gerado, dir.path().join("relatorio_por_cnpj.csv"));
    assert_eq!(
        fs::read_to_string(&resumo.arquivo_gerado).unwrap(),
        "Nome;CNPJ/CPF;Plano Interno;Fatura;Valor\n\
         Fulano;987.654.321-00;PI-7;55, 56;R$ 1.011,00\n"
    );
}

#[test]
fn nome_com_data_e_hora() {
    let dir = tempfile::tempdir().unwrap();
    let mapa = dir.path().join("mapa.xlsx");
    mapa_padrao(&mapa);

    let mut pedido = pedido(mapa, None, dir.path());
    pedido.com_timestamp = true;

    let resumo = converter(&pedido).unwrap();
    let nome = resumo.arquivo_gerado.file_name().unwrap().to_str().unwrap();

    let re = regex::Regex::new(r"^relatorio_por_cnpj_\d{8}_\d{6}\.xlsx$").unwrap();
    assert!(re.is_match(nome), "{nome}");
}

#[test]
fn mapa_inexistente() {
    let dir = tempfile::tempdir().unwrap();
    let err = converter(&pedido(dir.path().join("nao_existe.xlsx"), None, dir.path())).unwrap_err();
    assert!(matches!(err, MapaError::IoReader { .. }));
}
