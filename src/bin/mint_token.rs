//! Gera um token de acesso para desenvolvimento.
//!
//! Uso:
//! ```bash
//! # admin com tenant aleatório, válido por 8 horas
//! JWT_SECRET=segredo cargo run --bin mint_token
//!
//! # funcionário de um tenant específico
//! JWT_SECRET=segredo cargo run --bin mint_token -- \
//!     --tenant 550e8400-e29b-41d4-a716-446655440000 --role employee
//! ```
//!
//! O segredo vem de `JWT_SECRET` (ou `--secret`); precisa ser o mesmo do
//! servidor, senão o token é recusado.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use estoque_backend::models::auth::Claims;
use estoque_backend::services::token::sign_token;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut tenant = Uuid::new_v4().to_string();
    let mut subject = "dev-user".to_string();
    let mut role = "admin".to_string();
    let mut ttl_hours: i64 = 8;
    let mut secret = env::var("JWT_SECRET").unwrap_or_default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant = args[i + 1].clone();
                    i += 1;
                }
            }
            "--subject" | "-u" => {
                if i + 1 < args.len() {
                    subject = args[i + 1].clone();
                    i += 1;
                }
            }
            "--role" | "-r" => {
                if i + 1 < args.len() {
                    role = args[i + 1].clone();
                    i += 1;
                }
            }
            "--ttl" => {
                if i + 1 < args.len() {
                    ttl_hours = args[i + 1].parse().unwrap_or(8);
                    i += 1;
                }
            }
            "--secret" | "-s" => {
                if i + 1 < args.len() {
                    secret = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gerador de token de desenvolvimento");
                println!();
                println!("Uso: mint_token [OPÇÕES]");
                println!();
                println!("Opções:");
                println!("  -t, --tenant <UUID>    Tenant do token (padrão: aleatório)");
                println!("  -u, --subject <ID>     Identificador do usuário (padrão: dev-user)");
                println!("  -r, --role <PAPEL>     admin ou employee (padrão: admin)");
                println!("      --ttl <HORAS>      Validade em horas (padrão: 8)");
                println!("  -s, --secret <VALOR>   Segredo HMAC (padrão: env JWT_SECRET)");
                println!("  -h, --help             Mostra esta ajuda");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    if secret.is_empty() {
        anyhow::bail!("defina JWT_SECRET ou passe --secret");
    }
    // Valida cedo: um tenant mal formado geraria um token sempre recusado.
    let tenant_id: Uuid = tenant
        .parse()
        .map_err(|_| anyhow::anyhow!("--tenant precisa ser um UUID válido"))?;
    if role != "admin" && role != "employee" {
        anyhow::bail!("--role precisa ser admin ou employee");
    }

    let exp = Utc::now().timestamp() + ttl_hours * 3600;
    let claims = Claims {
        user_id: Some(subject.clone()),
        role: Some(role.clone()),
        company_id: Some(tenant_id.to_string()),
        exp: Some(exp),
    };

    let token = sign_token(&claims, &secret)?;

    println!("🔑 Token gerado ({role}, válido por {ttl_hours}h)");
    println!("   tenant:  {tenant_id}");
    println!("   usuário: {subject}");
    println!();
    println!("{token}");
    println!();
    println!("Exemplo:");
    println!("  curl -H \"Authorization: Bearer {token}\" \\");
    println!("       http://localhost:3001/api/inventory/products");

    Ok(())
}
