use chrono::{DateTime, Local};
use clap::ValueEnum;
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook};
use std::{
    fmt,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{COLUNA_INEX, COLUNA_ITEM, COLUNAS_AGREGADAS, LinhaFormatada, MapaError, MapaResult};

/// Prefixo do nome do arquivo gerado.
pub const PREFIXO_DO_RELATORIO: &str = "relatorio_por_cnpj";

/// Nome da aba do relatório xlsx.
pub const NOME_DA_ABA: &str = "Relatorio";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatoDeSaida {
    #[default]
    Xlsx,
    Csv,
}

impl FormatoDeSaida {
    pub fn extensao(self) -> &'static str {
        match self {
            FormatoDeSaida::Xlsx => "xlsx",
            FormatoDeSaida::Csv => "csv",
        }
    }
}

impl fmt::Display for FormatoDeSaida {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extensao())
    }
}

/// Linha final do relatório: colunas auxiliares da tabela INEX seguidas dos dados agregados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinhaRelatorio {
    pub item: String,
    pub inex: String,
    pub extras: Vec<String>,
    pub dados: LinhaFormatada,
    /// Houve correspondência na tabela INEX.
    pub encontrada: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relatorio {
    /// `Some` quando o relatório foi enriquecido com a tabela INEX.
    pub colunas_extras: Option<Vec<String>>,
    pub linhas: Vec<LinhaRelatorio>,
}

impl Relatorio {
    pub fn sem_enriquecimento(linhas: Vec<LinhaFormatada>) -> Self {
        let linhas = linhas
            .into_iter()
            .map(|dados| LinhaRelatorio {
                item: String::new(),
                inex: String::new(),
                extras: Vec::new(),
                dados,
                encontrada: false,
            })
            .collect();

        Relatorio {
            colunas_extras: None,
            linhas,
        }
    }

    pub fn enriquecido(&self) -> bool {
        self.colunas_extras.is_some()
    }

    pub fn linhas_encontradas(&self) -> usize {
        self.linhas.iter().filter(|l| l.encontrada).count()
    }

    /// Cabeçalho: ITEM e INEX primeiro (se enriquecido), as colunas agregadas
    /// e, por último, as demais colunas da tabela INEX.
    pub fn cabecalho(&self) -> Vec<&str> {
        match &self.colunas_extras {
            None => COLUNAS_AGREGADAS.to_vec(),
            Some(extras) => [COLUNA_ITEM, COLUNA_INEX]
                .into_iter()
                .chain(COLUNAS_AGREGADAS)
                .chain(extras.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Campos de uma linha, na ordem do cabeçalho.
    pub fn registro<'a>(&self, linha: &'a LinhaRelatorio) -> Vec<&'a str> {
        let dados = linha.dados.campos();

        if self.enriquecido() {
            [linha.item.as_str(), linha.inex.as_str()]
                .into_iter()
                .chain(dados)
                .chain(linha.extras.iter().map(String::as_str))
                .collect()
        } else {
            dados.to_vec()
        }
    }

    pub fn registros(&self) -> impl Iterator<Item = Vec<&str>> {
        self.linhas.iter().map(|linha| self.registro(linha))
    }
}

/// Nome do arquivo: `relatorio_por_cnpj_<AAAAMMDD_HHMMSS>.<ext>` ou, sem
/// carimbo de tempo, `relatorio_por_cnpj.<ext>`.
///
/// ```
/// use chrono::{Local, TimeZone};
/// use conversor_de_mapas::{FormatoDeSaida, nome_do_relatorio};
///
/// let momento = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
/// assert_eq!(
///     nome_do_relatorio(Some(momento), FormatoDeSaida::Xlsx),
///     "relatorio_por_cnpj_20250307_140509.xlsx"
/// );
/// assert_eq!(nome_do_relatorio(None, FormatoDeSaida::Csv), "relatorio_por_cnpj.csv");
/// ```
pub fn nome_do_relatorio(momento: Option<DateTime<Local>>, formato: FormatoDeSaida) -> String {
    match momento {
        Some(momento) => format!(
            "{PREFIXO_DO_RELATORIO}_{}.{formato}",
            momento.format("%Y%m%d_%H%M%S")
        ),
        None => format!("{PREFIXO_DO_RELATORIO}.{formato}"),
    }
}

/// Arquivo temporário, na mesma pasta do destino, usado durante a gravação.
pub fn caminho_temporario(destino: &Path) -> PathBuf {
    let hash = blake3::hash(destino.display().to_string().as_bytes());
    let nome = format!(
        ".{}.tmp.{}",
        destino
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        &hash.to_hex()[..16]
    );
    destino.with_file_name(nome)
}

/// Grava o relatório no destino.
///
/// O conteúdo é escrito num arquivo temporário e só então renomeado para o
/// destino: em caso de falha, nenhum arquivo parcial é deixado na pasta.
pub fn gravar_relatorio(
    relatorio: &Relatorio,
    destino: &Path,
    formato: FormatoDeSaida,
) -> MapaResult<()> {
    let temp_path = caminho_temporario(destino);
    debug!("Gravando <{}> via <{}>", destino.display(), temp_path.display());

    let resultado = match formato {
        FormatoDeSaida::Xlsx => gravar_xlsx(relatorio, &temp_path),
        FormatoDeSaida::Csv => gravar_csv(relatorio, &temp_path),
    }
    .and_then(|()| {
        fs::rename(&temp_path, destino).map_err(|e| MapaError::Gravacao {
            source: e,
            arquivo: destino.to_path_buf(),
        })
    });

    if resultado.is_err() && temp_path.exists() {
        // O erro original é o que interessa ao usuário
        let _ = fs::remove_file(&temp_path);
    }

    if resultado.is_ok() {
        info!(
            "Relatório gravado: <{}> ({} linhas)",
            destino.display(),
            relatorio.linhas.len()
        );
    }

    resultado
}

fn gravar_xlsx(relatorio: &Relatorio, path: &Path) -> MapaResult<()> {
    let mut workbook = Workbook::new();
    let negrito = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(NOME_DA_ABA)?;

    for (col, header) in relatorio.cabecalho().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &negrito)?;
    }

    for (row_idx, registro) in relatorio.registros().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, campo) in registro.iter().enumerate() {
            worksheet.write_string(row, col as u16, *campo)?;
        }
    }

    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}

fn gravar_csv(relatorio: &Relatorio, path: &Path) -> MapaResult<()> {
    let file = File::create(path).map_err(|e| MapaError::Gravacao {
        source: e,
        arquivo: path.to_path_buf(),
    })?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(BufWriter::new(file));

    wtr.write_record(relatorio.cabecalho())?;
    for registro in relatorio.registros() {
        wtr.write_record(registro)?;
    }

    // O flush garante que os dados saiam do buffer para o disco antes do rename
    let mut writer = wtr.into_inner().map_err(|e| MapaError::Io(e.into_error()))?;
    writer.flush()?;

    Ok(())
}
