use clap::Parser;
use std::path::PathBuf;

use crate::{FormatoDeSaida, MapaError, MapaResult, PedidoDeConversao};

// Estrutura para o Clap processar os argumentos da linha de comando
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// Clear screen
    #[arg(short, long, default_value_t = false)]
    clear: bool,

    /// Pasta onde o relatório será gravado.
    ///
    /// Padrão: pasta de Downloads do usuário.
    #[arg(short, long, env = "CONVERSOR_DESTINO")]
    destino: Option<PathBuf>,

    /// Formato do relatório gerado
    #[arg(short, long, value_enum, default_value_t = FormatoDeSaida::Xlsx)]
    formato: FormatoDeSaida,

    /// Tabela de referência INEX (colunas CNPJ, INEX e, opcionalmente, ITEM)
    #[arg(short, long)]
    inex: Option<PathBuf>,

    /// Mapa de execução orçamentária.
    ///
    /// Colunas esperadas:
    ///
    /// - `Nome`, `CNPJ`, `CPF`, `Plano Interno`, `Fatura`, `Valor`
    #[arg(short, long)]
    mapa: Option<PathBuf>,

    /// Gravar `relatorio_por_cnpj.<ext>`, sem data e hora no nome
    #[arg(long, default_value_t = false)]
    sem_timestamp: bool,

    /// Ativar modo detalhado (verbose)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug)]
pub struct Config {
    pub clear: bool,
    pub verbose: bool,
    pub pedido: PedidoDeConversao,
}

/// Pasta de Downloads do usuário, com recuo para `~/Downloads` e, por fim, a pasta atual.
pub fn pasta_padrao() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .filter(|pasta| pasta.is_dir())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn get_config() -> MapaResult<Config> {
    let args = Arguments::parse();
    config_a_partir_de(args)
}

fn config_a_partir_de(args: Arguments) -> MapaResult<Config> {
    // 1. Sem mapa não há conversão
    let arquivo_mapa = args.mapa.ok_or(MapaError::MapaNaoSelecionado)?;

    // 2. Pasta de destino: argumento, variável de ambiente ou Downloads
    let pasta_destino = args.destino.unwrap_or_else(pasta_padrao);

    if !pasta_destino.is_dir() {
        return Err(MapaError::Config(format!(
            "Pasta de destino inexistente: {}",
            pasta_destino.display()
        )));
    }

    Ok(Config {
        clear: args.clear,
        verbose: args.verbose,
        pedido: PedidoDeConversao {
            arquivo_mapa,
            arquivo_inex: args.inex,
            pasta_destino,
            formato: args.formato,
            com_timestamp: !args.sem_timestamp,
        },
    })
}
