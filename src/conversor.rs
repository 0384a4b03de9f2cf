use chrono::Local;
use log::info;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    FormatoDeSaida, LinhaMapa, MapaResult, Relatorio, TabelaInex, agrupar, enriquecer,
    fmt_milhares, formatar_linhas, formatar_moeda, gravar_relatorio, ler_inex, ler_mapa,
    nome_do_relatorio,
};

/// Limpar a tela.
pub fn clear_screen(clear_screen: bool) -> MapaResult<()> {
    if clear_screen {
        if cfg!(target_os = "windows") {
            // No Windows, 'cls' é um comando interno do 'cmd'.
            Command::new("cmd").args(["/c", "cls"]).status()?;
        } else {
            Command::new("clear").status()?;
        }
    }

    Ok(())
}

/// Exibe a descrição e a versão do programa.
pub fn imprimir_versao_do_programa() {
    let descr = [
        "Este programa transforma mapas de execução orçamentária em relatórios organizados por CNPJ/CPF e Plano Interno,",
        "facilitando a solicitação de notas fiscais.",
        "As linhas do mapa são agrupadas pelo identificador do contribuinte (CNPJ ou, na falta deste, CPF) e pelo Plano Interno.",
        "Para cada grupo são reunidas as faturas distintas e somados os valores.",
        "Opcionalmente, cada grupo é complementado com as colunas ITEM e INEX de uma tabela de referência.",
    ];

    for line in &descr {
        println!(" {}", line);
    }

    println!("\n versão: {}\n", env!("CARGO_PKG_VERSION"));
}

/// Pedido de conversão: tudo o que uma execução precisa, montado uma única vez.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedidoDeConversao {
    pub arquivo_mapa: PathBuf,
    pub arquivo_inex: Option<PathBuf>,
    pub pasta_destino: PathBuf,
    pub formato: FormatoDeSaida,
    /// Incluir data e hora no nome do arquivo gerado.
    pub com_timestamp: bool,
}

/// Mensagem de situação exibida ao usuário.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Inicial,
    ArquivoSelecionado(PathBuf),
    PastaSelecionada(PathBuf),
    Sucesso(PathBuf),
    Erro(String),
}

fn nome_do_arquivo(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Inicial => write!(f, "📂 Selecione um mapa para gerar o relatório."),
            Status::ArquivoSelecionado(path) => {
                write!(f, "📄 Arquivo selecionado: {}", nome_do_arquivo(path))
            }
            Status::PastaSelecionada(path) => write!(f, "📂 Pasta selecionada: {}", path.display()),
            Status::Sucesso(path) => write!(f, "✅ Arquivo salvo em: {}", nome_do_arquivo(path)),
            Status::Erro(msg) => write!(f, "❌ Erro: {msg}"),
        }
    }
}

/// Estatísticas de uma conversão concluída.
#[derive(Debug, Clone, PartialEq)]
pub struct Resumo {
    pub arquivo_gerado: PathBuf,
    pub linhas_lidas: usize,
    pub grupos: usize,
    pub valor_total: f64,
    /// Grupos com correspondência na tabela INEX (`None` sem enriquecimento).
    pub grupos_enriquecidos: Option<usize>,
}

pub fn imprimir_resumo(resumo: &Resumo) {
    println!(" --- Resumo da Conversão ---");
    println!(" Linhas lidas do mapa: {:>9}", fmt_milhares(resumo.linhas_lidas));
    println!(" Grupos (CNPJ/CPF, Plano Interno): {:>9}", fmt_milhares(resumo.grupos));
    println!(" Valor total: {}", formatar_moeda(resumo.valor_total));

    if let Some(encontrados) = resumo.grupos_enriquecidos {
        println!(
            " Grupos com correspondência na tabela INEX: {} de {}",
            fmt_milhares(encontrados),
            fmt_milhares(resumo.grupos)
        );
    }
    println!();
}

/// Agrupa, formata e, se houver tabela INEX, enriquece as linhas do mapa.
pub fn gerar_relatorio(linhas: &[LinhaMapa], inex: Option<&TabelaInex>) -> Relatorio {
    let grupos = agrupar(linhas);
    let formatadas = formatar_linhas(&grupos);

    match inex {
        Some(tabela) => enriquecer(formatadas, tabela),
        None => Relatorio::sem_enriquecimento(formatadas),
    }
}

/// Executa a conversão completa: leitura, agrupamento, formatação,
/// enriquecimento opcional e gravação.
///
/// Retorna o resumo com o caminho do arquivo gerado.
pub fn converter(pedido: &PedidoDeConversao) -> MapaResult<Resumo> {
    // 1. Carregamento
    let linhas = ler_mapa(&pedido.arquivo_mapa)?;
    info!("Mapa <{}>: {} linhas", pedido.arquivo_mapa.display(), linhas.len());

    let inex = pedido.arquivo_inex.as_deref().map(ler_inex).transpose()?;
    if let Some(tabela) = &inex {
        info!("Tabela INEX: {} linhas", tabela.linhas.len());
    }

    // 2. Agrupamento, formatação e enriquecimento
    let relatorio = gerar_relatorio(&linhas, inex.as_ref());

    // 3. Gravação
    let momento = pedido.com_timestamp.then(Local::now);
    let destino = pedido
        .pasta_destino
        .join(nome_do_relatorio(momento, pedido.formato));

    gravar_relatorio(&relatorio, &destino, pedido.formato)?;

    Ok(Resumo {
        arquivo_gerado: destino,
        linhas_lidas: linhas.len(),
        grupos: relatorio.linhas.len(),
        valor_total: linhas.iter().map(|l| l.valor).sum(),
        grupos_enriquecidos: relatorio
            .enriquecido()
            .then(|| relatorio.linhas_encontradas()),
    })
}
