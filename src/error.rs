use std::{io, path::PathBuf};
use thiserror::Error;

/// Tipo de retorno conveniente para todo o projeto
pub type MapaResult<T> = Result<T, MapaError>;

#[derive(Error, Debug)]
pub enum MapaError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro no processamento CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arquivo <{arquivo}> contém colunas repetidas: <{coluna}>")]
    DuplicateColumnName { arquivo: PathBuf, coluna: String },

    #[error("Formato de planilha não suportado: {arquivo:?}\nFormatos aceitos: xlsx, xlsm, xlsb, xls, ods, csv")]
    FormatoNaoSuportado { arquivo: PathBuf },

    #[error(
        "Falha ao gravar o relatório!\n\
        Arquivo: {arquivo:?}\n\
        {source}"
    )]
    Gravacao {
        #[source]
        source: io::Error,
        arquivo: PathBuf,
    },

    #[error("Erro de I/O: {0}")]
    Io(#[from] io::Error),

    #[error(
        "Arquivo não encontrado!\n\
        Arquivo: {arquivo:?}\n\
        {source}"
    )]
    IoReader {
        #[source] // Indica que este é o erro original
        source: io::Error,
        arquivo: PathBuf,
    },

    #[error(
        "Nenhum mapa selecionado!\n\
        Exemplo:\n\
        conversor_de_mapas -m 'Mapa de Execução.xlsx'"
    )]
    MapaNaoSelecionado,

    #[error("Coluna essencial ausente no arquivo <{arquivo}>: {coluna} (Tipo: {tipo:?})")]
    MissingEssentialColumn {
        arquivo: PathBuf,
        coluna: String,
        tipo: crate::metadata::TipoDeArquivo,
    },

    #[error("Erro na leitura da planilha: {0}")]
    Planilha(#[from] calamine::Error),

    #[error("Planilha sem cabeçalho ou sem abas: {arquivo:?}")]
    PlanilhaVazia { arquivo: PathBuf },

    #[error(
        "Valor não numérico na coluna 'Valor'!\n\
        Arquivo: {arquivo:?}\n\
        Linha nº: {linha}\n\
        Conteúdo: '{valor}'"
    )]
    ValorInvalido {
        arquivo: PathBuf,
        linha: usize,
        valor: String,
    },

    #[error("Erro na gravação do arquivo xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
