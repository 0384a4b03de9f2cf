mod agrupamento;
mod args;
mod conversor;
mod enriquecimento;
mod error;
mod formatacao;
mod identificador;
mod metadata;
mod planilha;
mod regex;
mod relatorio;

pub use self::{
    agrupamento::*, args::*, conversor::*, enriquecimento::*, error::*, formatacao::*,
    identificador::*, metadata::*, planilha::*, regex::*, relatorio::*,
};
