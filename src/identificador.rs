use crate::{LinhaMapa, eh_sentinela};

/// Normaliza o CNPJ lido do mapa: valores sentinela viram ausência.
pub fn normalizar_cnpj(cnpj: Option<&str>) -> Option<&str> {
    cnpj.filter(|texto| !eh_sentinela(texto))
}

/// Identificador do contribuinte: o CNPJ, quando presente, senão o CPF.
///
/// O CPF é repassado sem qualquer tratamento. Se ambos estiverem ausentes,
/// o resultado é `None`, que forma um grupo próprio no agrupamento.
///
/// ```
/// use conversor_de_mapas::resolver_identificador;
///
/// assert_eq!(resolver_identificador(Some("12345678000199"), Some("1")), Some("12345678000199"));
/// assert_eq!(resolver_identificador(Some("0"), Some("12345678901")), Some("12345678901"));
/// assert_eq!(resolver_identificador(Some("nan"), None), None);
/// ```
pub fn resolver_identificador<'a>(cnpj: Option<&'a str>, cpf: Option<&'a str>) -> Option<&'a str> {
    normalizar_cnpj(cnpj).or(cpf)
}

impl LinhaMapa {
    /// Identificador resolvido desta linha (CNPJ ou, na falta, CPF).
    pub fn identificador(&self) -> Option<&str> {
        resolver_identificador(self.cnpj.as_deref(), self.cpf.as_deref())
    }
}
