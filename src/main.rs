use env_logger::Env;
use execution_time::ExecutionTime;
use std::process;

use conversor_de_mapas::{
    MapaError, MapaResult, Status, clear_screen, converter, get_config, imprimir_resumo,
    imprimir_versao_do_programa,
};

fn main() {
    // Toda falha da conversão chega aqui e vira uma única mensagem ao usuário
    if let Err(err) = run() {
        if matches!(err, MapaError::MapaNaoSelecionado) {
            eprintln!("{}", Status::Inicial);
        }
        eprintln!("\n{}", Status::Erro(err.to_string()));
        process::exit(1);
    }
}

fn run() -> MapaResult<()> {
    let timer = ExecutionTime::start();

    // 1. Obter Configurações
    let config = get_config()?;

    // 2. Logging: RUST_LOG prevalece sobre o padrão
    let nivel = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(nivel)).init();

    // 3. Setup inicial
    clear_screen(config.clear)?;
    imprimir_versao_do_programa();

    if config.verbose {
        println!("{:#?}\n", config);
    }

    let pedido = &config.pedido;
    println!("{}", Status::ArquivoSelecionado(pedido.arquivo_mapa.clone()));
    if let Some(inex) = &pedido.arquivo_inex {
        println!("📄 Tabela INEX: {}", inex.display());
    }
    println!("{}\n", Status::PastaSelecionada(pedido.pasta_destino.clone()));

    // 4. Conversão
    let resumo = converter(pedido)?;

    imprimir_resumo(&resumo);
    println!("{}\n", Status::Sucesso(resumo.arquivo_gerado.clone()));

    timer.print_elapsed_time();

    Ok(())
}
