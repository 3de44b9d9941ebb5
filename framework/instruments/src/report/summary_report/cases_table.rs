use tabled::Tabled;

#[derive(Tabled)]
pub struct CaseRow {
    pub case: String,
    pub result: String,
    #[tabled(display = "float2")]
    pub elapsed_ms: f64,
    #[tabled(display = "float2")]
    pub crypt_ms: f64,
    #[tabled(display = "float2")]
    pub write_ms: f64,
    #[tabled(display = "float2")]
    pub read_ms: f64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}
