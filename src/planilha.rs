use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, warn};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    COLUNA_ITEM, COLUNAS_AGREGADAS, COLUNAS_INEX, MapaError, MapaResult, RE_VALOR_BRASILEIRO,
    RE_VALOR_DECIMAL, REGEX_PLANILHA_CALAMINE, REGEX_PLANILHA_CSV, TipoDeArquivo,
    colunas_essenciais,
};

/// Conteúdo de uma célula, já desacoplado do formato de origem.
#[derive(Debug, Clone, PartialEq)]
pub enum Celula {
    Vazia,
    Texto(String),
    Numero(f64),
}

impl Celula {
    /// Representação textual da célula.
    ///
    /// Números inteiros são exibidos sem parte fracionária, preservando
    /// CNPJ, CPF e Fatura que a planilha armazenou como número.
    ///
    /// ```
    /// use conversor_de_mapas::Celula;
    ///
    /// assert_eq!(Celula::Numero(12345678000199.0).texto().as_deref(), Some("12345678000199"));
    /// assert_eq!(Celula::Numero(10.5).texto().as_deref(), Some("10.5"));
    /// assert_eq!(Celula::Vazia.texto(), None);
    /// ```
    pub fn texto(&self) -> Option<String> {
        match self {
            Celula::Vazia => None,
            Celula::Texto(s) => Some(s.clone()),
            Celula::Numero(n) if *n == 0.0 => Some("0".to_string()),
            Celula::Numero(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{n:.0}")),
            Celula::Numero(n) => Some(n.to_string()),
        }
    }

    /// Vazia ou composta apenas de espaços.
    pub fn em_branco(&self) -> bool {
        match self {
            Celula::Vazia => true,
            Celula::Texto(s) => s.trim().is_empty(),
            Celula::Numero(_) => false,
        }
    }
}

impl From<&Data> for Celula {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => Celula::Vazia,
            Data::String(v) => Celula::Texto(v.to_string()),
            Data::Float(v) => Celula::Numero(*v),
            Data::Int(v) => Celula::Numero(*v as f64),
            Data::Bool(v) => Celula::Texto(v.to_string()),
            Data::DateTime(v) => Celula::Texto(v.to_string()),
            Data::DateTimeIso(v) => Celula::Texto(v.to_string()),
            Data::DurationIso(v) => Celula::Texto(v.to_string()),
            Data::Error(v) => Celula::Texto(format!("{v:?}")),
        }
    }
}

/// Planilha carregada em memória: cabeçalho e linhas de células.
#[derive(Debug, Clone)]
pub struct Tabela {
    pub arquivo: PathBuf,
    pub cabecalho: Vec<String>,
    pub linhas: Vec<Vec<Celula>>,
}

impl Tabela {
    /// Posição da coluna essencial `campo` (ex: "plano_interno") no cabeçalho.
    pub fn indice_da_coluna(&self, tipo: TipoDeArquivo, campo: &str) -> MapaResult<usize> {
        let nome_da_coluna = colunas_essenciais(tipo)
            .get(campo)
            .ok_or_else(|| MapaError::Config(format!("Configuração '{campo}' ausente")))?;

        self.cabecalho
            .iter()
            .position(|col| col == nome_da_coluna)
            .ok_or_else(|| MapaError::MissingEssentialColumn {
                arquivo: self.arquivo.clone(),
                coluna: nome_da_coluna.to_string(),
                tipo,
            })
    }

    /// Linhas com ao menos uma célula preenchida, acompanhadas do nº da linha na planilha.
    pub fn linhas_preenchidas(&self) -> impl Iterator<Item = (usize, &[Celula])> {
        self.linhas
            .iter()
            .enumerate()
            // A linha 1 é o cabeçalho
            .map(|(idx, linha)| (idx + 2, linha.as_slice()))
            .filter(|(_, linha)| !linha.iter().all(Celula::em_branco))
    }
}

fn celula(linha: &[Celula], idx: usize) -> &Celula {
    linha.get(idx).unwrap_or(&Celula::Vazia)
}

/// Lê a primeira aba de uma planilha (xlsx, xlsm, xlsb, xls, ods) ou um arquivo CSV.
pub fn ler_tabela(arquivo: &Path) -> MapaResult<Tabela> {
    // Erro de arquivo inexistente com a mesma mensagem para todos os formatos
    fs::metadata(arquivo).map_err(|e| MapaError::IoReader {
        source: e,
        arquivo: arquivo.to_path_buf(),
    })?;

    let nome = arquivo
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let tabela = if REGEX_PLANILHA_CALAMINE.is_match(nome) {
        ler_tabela_calamine(arquivo)?
    } else if REGEX_PLANILHA_CSV.is_match(nome) {
        ler_tabela_csv(arquivo)?
    } else {
        return Err(MapaError::FormatoNaoSuportado {
            arquivo: arquivo.to_path_buf(),
        });
    };

    debug!(
        "Planilha <{}>: {} colunas, {} linhas",
        arquivo.display(),
        tabela.cabecalho.len(),
        tabela.linhas.len()
    );

    Ok(tabela)
}

fn ler_tabela_calamine(arquivo: &Path) -> MapaResult<Tabela> {
    let mut workbook = open_workbook_auto(arquivo)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MapaError::PlanilhaVazia {
            arquivo: arquivo.to_path_buf(),
        })??;

    let mut rows = range.rows();

    let cabecalho: Vec<String> = rows
        .next()
        .ok_or_else(|| MapaError::PlanilhaVazia {
            arquivo: arquivo.to_path_buf(),
        })?
        .iter()
        .map(|cell| {
            Celula::from(cell)
                .texto()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .collect();

    let linhas = rows
        .map(|row| row.iter().map(Celula::from).collect())
        .collect();

    Ok(Tabela {
        arquivo: arquivo.to_path_buf(),
        cabecalho,
        linhas,
    })
}

/// Delimitador do CSV: ';' se a linha de cabeçalho contiver um, senão ','.
///
/// ```
/// use conversor_de_mapas::detectar_delimitador;
///
/// assert_eq!(detectar_delimitador("Nome;CNPJ;CPF\nA;1;2"), b';');
/// assert_eq!(detectar_delimitador("Nome,CNPJ,CPF"), b',');
/// ```
pub fn detectar_delimitador(conteudo: &str) -> u8 {
    let primeira_linha = conteudo.lines().next().unwrap_or_default();
    if primeira_linha.contains(';') { b';' } else { b',' }
}

fn ler_tabela_csv(arquivo: &Path) -> MapaResult<Tabela> {
    let bytes = fs::read(arquivo).map_err(|e| MapaError::IoReader {
        source: e,
        arquivo: arquivo.to_path_buf(),
    })?;

    // Exportações antigas podem vir em Latin-1: caracteres inválidos viram U+FFFD
    let conteudo = String::from_utf8_lossy(&bytes);
    let conteudo = conteudo.trim_start_matches('\u{feff}');

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(detectar_delimitador(conteudo))
        .has_headers(true)
        .flexible(true) // Linhas curtas: células ausentes são tratadas como vazias
        .from_reader(conteudo.as_bytes());

    let cabecalho: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let linhas = rdr
        .records()
        .map(|result| -> MapaResult<Vec<Celula>> {
            let record = result?;
            Ok(record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Celula::Vazia
                    } else {
                        Celula::Texto(field.to_string())
                    }
                })
                .collect())
        })
        .collect::<MapaResult<Vec<Vec<Celula>>>>()?;

    Ok(Tabela {
        arquivo: arquivo.to_path_buf(),
        cabecalho,
        linhas,
    })
}

/// Valida o cabeçalho: colunas essenciais presentes e não repetidas.
///
/// Colunas com nome em branco são ignoradas (planilhas costumam trazer
/// colunas vazias à direita dos dados).
pub fn verificar_existencia_de_colunas_essenciais(
    column_names: &[&str],
    tipo: TipoDeArquivo,
    arquivo: &Path,
) -> MapaResult<()> {
    let essenciais: HashSet<&str> = colunas_essenciais(tipo).values().copied().collect();

    // 1. Validar nomes repetidos entre as colunas que serão lidas
    let mut vista = HashSet::with_capacity(column_names.len());

    for name in column_names.iter().filter(|name| !name.trim().is_empty()) {
        if !vista.insert(*name) && (essenciais.contains(name) || *name == COLUNA_ITEM) {
            return Err(MapaError::DuplicateColumnName {
                arquivo: arquivo.to_path_buf(),
                coluna: name.to_string(),
            });
        }
    }

    // 2. find() retorna a primeira coluna essencial que NÃO está contida no cabeçalho
    let mut ordenadas: Vec<&str> = essenciais.into_iter().collect();
    ordenadas.sort_unstable();

    if let Some(ausente) = ordenadas
        .into_iter()
        .find(|essencial| !column_names.contains(essencial))
    {
        return Err(MapaError::MissingEssentialColumn {
            arquivo: arquivo.to_path_buf(),
            coluna: ausente.to_string(),
            tipo,
        });
    }

    Ok(())
}

/// Converte o conteúdo da coluna `Valor` em número.
///
/// Aceita a notação com ponto decimal (`1234.5`) e a brasileira
/// (`1.234,50`), com ou sem o prefixo `R$`. Sem vírgula, um único ponto
/// é separador decimal (`1.234` vale 1,234); dois ou mais pontos em
/// grupos de três dígitos são separadores de milhar (`1.234.567`).
/// Qualquer outra grafia, como `1,234.50` ou `1e3`, é rejeitada.
///
/// ```
/// use conversor_de_mapas::converter_valor;
///
/// assert_eq!(converter_valor("1234.5"), Some(1234.5));
/// assert_eq!(converter_valor("R$ 1.234,50"), Some(1234.5));
/// assert_eq!(converter_valor("-10,00"), Some(-10.0));
/// assert_eq!(converter_valor("1,234.50"), None);
/// assert_eq!(converter_valor("abc"), None);
/// assert_eq!(converter_valor("nan"), None);
/// ```
pub fn converter_valor(texto: &str) -> Option<f64> {
    let texto = texto.trim();
    let texto = texto.strip_prefix("R$").unwrap_or(texto).trim();

    let normalizado = if RE_VALOR_DECIMAL.is_match(texto) {
        texto.to_string()
    } else if RE_VALOR_BRASILEIRO.is_match(texto) {
        texto.replace('.', "").replace(',', ".")
    } else {
        return None;
    };

    normalizado
        .parse::<f64>()
        .ok()
        .filter(|valor| valor.is_finite())
}

/// Linha do mapa de execução orçamentária.
#[derive(Debug, Clone, PartialEq)]
pub struct LinhaMapa {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub cpf: Option<String>,
    pub plano_interno: String,
    pub fatura: Option<String>,
    pub valor: f64,
}

/// Carrega o mapa e converte cada linha em `LinhaMapa`.
///
/// Um `Valor` ausente ou não numérico interrompe a leitura com
/// `MapaError::ValorInvalido`, indicando a linha da planilha.
pub fn ler_mapa(arquivo: &Path) -> MapaResult<Vec<LinhaMapa>> {
    let tabela = ler_tabela(arquivo)?;
    linhas_do_mapa(&tabela)
}

pub fn linhas_do_mapa(tabela: &Tabela) -> MapaResult<Vec<LinhaMapa>> {
    let column_names: Vec<&str> = tabela.cabecalho.iter().map(String::as_str).collect();
    verificar_existencia_de_colunas_essenciais(&column_names, TipoDeArquivo::Mapa, &tabela.arquivo)?;

    let tipo = TipoDeArquivo::Mapa;
    let idx_nome = tabela.indice_da_coluna(tipo, "nome")?;
    let idx_cnpj = tabela.indice_da_coluna(tipo, "cnpj")?;
    let idx_cpf = tabela.indice_da_coluna(tipo, "cpf")?;
    let idx_plano = tabela.indice_da_coluna(tipo, "plano_interno")?;
    let idx_fatura = tabela.indice_da_coluna(tipo, "fatura")?;
    let idx_valor = tabela.indice_da_coluna(tipo, "valor")?;

    let linhas = tabela
        .linhas_preenchidas()
        .map(|(num_linha, linha)| -> MapaResult<LinhaMapa> {
            let valor = match celula(linha, idx_valor) {
                Celula::Numero(n) if n.is_finite() => Some(*n),
                Celula::Texto(s) => converter_valor(s),
                _ => None,
            }
            .ok_or_else(|| MapaError::ValorInvalido {
                arquivo: tabela.arquivo.clone(),
                linha: num_linha,
                valor: celula(linha, idx_valor).texto().unwrap_or_default(),
            })?;

            Ok(LinhaMapa {
                nome: celula(linha, idx_nome).texto(),
                cnpj: celula(linha, idx_cnpj).texto(),
                cpf: celula(linha, idx_cpf).texto(),
                plano_interno: celula(linha, idx_plano).texto().unwrap_or_default(),
                fatura: celula(linha, idx_fatura).texto(),
                valor,
            })
        })
        .collect::<MapaResult<Vec<LinhaMapa>>>()?;

    debug!("Mapa <{}>: {} linhas lidas", tabela.arquivo.display(), linhas.len());

    Ok(linhas)
}

/// Linha da tabela de referência INEX.
#[derive(Debug, Clone, PartialEq)]
pub struct LinhaInex {
    pub cnpj: String,
    pub item: String,
    pub inex: String,
    /// Demais colunas, na ordem de `TabelaInex::colunas_extras`.
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabelaInex {
    pub colunas_extras: Vec<String>,
    pub linhas: Vec<LinhaInex>,
}

pub fn ler_inex(arquivo: &Path) -> MapaResult<TabelaInex> {
    let tabela = ler_tabela(arquivo)?;
    linhas_do_inex(&tabela)
}

/// Coluna extra com o mesmo nome de uma coluna agregada recebe o sufixo ` (INEX)`.
fn nome_da_coluna_extra(coluna: &str) -> String {
    if COLUNAS_AGREGADAS.contains(&coluna) {
        format!("{coluna} (INEX)")
    } else {
        coluna.to_string()
    }
}

pub fn linhas_do_inex(tabela: &Tabela) -> MapaResult<TabelaInex> {
    let column_names: Vec<&str> = tabela.cabecalho.iter().map(String::as_str).collect();
    verificar_existencia_de_colunas_essenciais(&column_names, TipoDeArquivo::Inex, &tabela.arquivo)?;

    let idx_cnpj = tabela.indice_da_coluna(TipoDeArquivo::Inex, "cnpj")?;
    let idx_inex = tabela.indice_da_coluna(TipoDeArquivo::Inex, "inex")?;
    let idx_item = tabela.cabecalho.iter().position(|col| col == COLUNA_ITEM);

    if idx_item.is_none() {
        warn!(
            "Tabela INEX <{}> sem coluna {COLUNA_ITEM}: coluna será preenchida em branco",
            tabela.arquivo.display()
        );
    }

    let essenciais: Vec<&str> = COLUNAS_INEX.values().copied().collect();
    let extras: Vec<(usize, String)> = tabela
        .cabecalho
        .iter()
        .enumerate()
        .filter(|(_, col)| {
            !col.is_empty() && col.as_str() != COLUNA_ITEM && !essenciais.contains(&col.as_str())
        })
        .map(|(idx, col)| (idx, nome_da_coluna_extra(col)))
        .collect();

    let texto = |linha: &[Celula], idx: usize| celula(linha, idx).texto().unwrap_or_default();

    let linhas = tabela
        .linhas_preenchidas()
        .map(|(_, linha)| LinhaInex {
            cnpj: texto(linha, idx_cnpj),
            item: idx_item.map(|idx| texto(linha, idx)).unwrap_or_default(),
            inex: texto(linha, idx_inex),
            extras: extras.iter().map(|(idx, _)| texto(linha, *idx)).collect(),
        })
        .collect();

    Ok(TabelaInex {
        colunas_extras: extras.into_iter().map(|(_, col)| col).collect(),
        linhas,
    })
}
