use thiserror::Error;

/// Erros possíveis durante a importação de extratos bancários
#[derive(Error, Debug)]
pub enum StatementParseError {
    /// Falha genérica durante o parsing do conteúdo (detalhe na mensagem)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// Formato do arquivo não é suportado pela biblioteca
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Erro ao ler o conteúdo do arquivo do disco
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// O builder foi chamado sem fornecer conteúdo nem caminho de arquivo
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    // ── Erros de linha (a linha é ignorada, nunca abortam a importação) ────────

    /// Data em formato diferente de DD/MM/YYYY
    #[error("Invalid CSV date format")]
    CsvDateInvalidFormat,

    /// Valor que não é um decimal com vírgula
    #[error("Invalid amount format in CSV: {0}")]
    CsvAmountInvalid(String),

    /// Registo que o leitor CSV não conseguiu descodificar
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ── Configuração e saída ───────────────────────────────────────────────────

    /// Ficheiro de configuração JSON inválido
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Chave de membro ou categoria que não pode virar identificador SQL
    #[error("Invalid rule key: {0}")]
    InvalidRuleKey(String),

    /// Falha ao escrever o SQL gerado
    #[error("Failed to write SQL output: {0}")]
    Write(#[source] std::io::Error),
}

/// Alias conveniente para Result com nosso tipo de erro principal
pub type StatementResult<T> = Result<T, StatementParseError>;
