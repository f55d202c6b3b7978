// tests/api.rs
//
// Testes de caixa-preta: sobem o MESMO router do binário com o store em
// memória, numa porta efêmera, e falam HTTP de verdade via reqwest.

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use estoque_backend::build_router;
use estoque_backend::config::AppState;
use estoque_backend::db::InMemoryInventoryStore;
use estoque_backend::models::auth::Claims;
use estoque_backend::services::token::sign_token;

const JWT_SECRET: &str = "segredo-de-teste";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let store = Arc::new(InMemoryInventoryStore::new());
        let state = AppState::with_store(store, JWT_SECRET);
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("falha ao abrir porta efêmera");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}/api");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_token(role: &str, tenant_id: Uuid) -> String {
    let claims = Claims {
        user_id: Some("usuario-teste".to_string()),
        role: Some(role.to_string()),
        company_id: Some(tenant_id.to_string()),
        exp: Some(Utc::now().timestamp() + 600),
    };
    sign_token(&claims, JWT_SECRET).expect("falha ao assinar token de teste")
}

fn mint_expired_token(tenant_id: Uuid) -> String {
    let claims = Claims {
        user_id: Some("usuario-teste".to_string()),
        role: Some("admin".to_string()),
        company_id: Some(tenant_id.to_string()),
        exp: Some(Utc::now().timestamp() - 10),
    };
    sign_token(&claims, JWT_SECRET).expect("falha ao assinar token de teste")
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    stock: i32,
) -> Value {
    let res = client
        .post(format!("{base_url}/inventory/products"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "price": 12.5, "stock": stock, "minStock": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn saude_e_publica_e_sem_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn rotas_protegidas_exigem_token_valido() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/inventory/products", srv.base_url);

    // Sem token.
    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Token rasgado.
    let res = client.get(&url).bearer_auth("nao.e.token").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Token expirado: mesma resposta genérica, sem vazar o motivo.
    let expirado = mint_expired_token(Uuid::new_v4());
    let res = client.get(&url).bearer_auth(&expirado).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
}

#[tokio::test]
async fn token_assinado_com_outro_segredo_e_recusado() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let claims = Claims {
        user_id: Some("intruso".to_string()),
        role: Some("admin".to_string()),
        company_id: Some(Uuid::new_v4().to_string()),
        exp: Some(Utc::now().timestamp() + 600),
    };
    let forjado = sign_token(&claims, "outro-segredo").unwrap();

    let res = client
        .get(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&forjado)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn funcionario_nao_mexe_em_dados_mestres() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = Uuid::new_v4();
    let funcionario = mint_token("employee", tenant);

    // Leitura passa.
    let res = client
        .get(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&funcionario)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Escrita de dado mestre não.
    let res = client
        .post(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&funcionario)
        .json(&json!({ "name": "Caneta", "price": 2.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Ação não permitida.");
}

#[tokio::test]
async fn funcionario_movimenta_mas_nao_reverte() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = Uuid::new_v4();
    let admin = mint_token("admin", tenant);
    let funcionario = mint_token("employee", tenant);

    let produto = create_product(&client, &srv.base_url, &admin, "Caderno", 10).await;
    let produto_id = produto["id"].as_str().unwrap();

    // Funcionário registra a saída.
    let res = client
        .post(format!("{}/inventory/movements", srv.base_url))
        .bearer_auth(&funcionario)
        .json(&json!({ "productId": produto_id, "type": "out", "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let criado: Value = res.json().await.unwrap();
    assert_eq!(criado["product"]["stock"], 7);
    let movimento_id = criado["movement"]["id"].as_str().unwrap().to_string();

    // Mas a reversão é só de admin.
    let res = client
        .delete(format!("{}/inventory/movements/{movimento_id}", srv.base_url))
        .bearer_auth(&funcionario)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/inventory/movements/{movimento_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let revertido: Value = res.json().await.unwrap();
    assert_eq!(revertido["product"]["stock"], 10);
    assert_eq!(revertido["movement"]["status"], "inactive");
}

#[tokio::test]
async fn ciclo_completo_do_razao_via_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = Uuid::new_v4();
    let admin = mint_token("admin", tenant);

    let produto = create_product(&client, &srv.base_url, &admin, "Caderno", 10).await;
    let produto_id = produto["id"].as_str().unwrap();

    // Saída de 4: estoque vai a 6.
    let res = client
        .post(format!("{}/inventory/movements", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "productId": produto_id, "type": "out", "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let saida: Value = res.json().await.unwrap();
    assert_eq!(saida["product"]["stock"], 6);
    let movimento_id = saida["movement"]["id"].as_str().unwrap().to_string();

    // Saída de 10 não cabe: 400 e nada muda.
    let res = client
        .post(format!("{}/inventory/movements", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "productId": produto_id, "type": "out", "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Estoque insuficiente.");

    let res = client
        .get(format!("{}/inventory/products/{produto_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let atual: Value = res.json().await.unwrap();
    assert_eq!(atual["stock"], 6);

    // Reversão devolve o estoque.
    let res = client
        .delete(format!("{}/inventory/movements/{movimento_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let revertido: Value = res.json().await.unwrap();
    assert_eq!(revertido["product"]["stock"], 10);

    // Reverter de novo: a movimentação ativa já não existe.
    let res = client
        .delete(format!("{}/inventory/movements/{movimento_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn isolamento_total_entre_tenants() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin1 = mint_token("admin", Uuid::new_v4());
    let admin2 = mint_token("admin", Uuid::new_v4());

    let produto = create_product(&client, &srv.base_url, &admin1, "Exclusivo", 5).await;
    let produto_id = produto["id"].as_str().unwrap();

    // Outro tenant não lê.
    let res = client
        .get(format!("{}/inventory/products/{produto_id}", srv.base_url))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Nem movimenta.
    let res = client
        .patch(format!("{}/inventory/products/{produto_id}/restock", srv.base_url))
        .bearer_auth(&admin2)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // E a listagem dele segue vazia.
    let res = client
        .get(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&admin2)
        .send()
        .await
        .unwrap();
    let lista: Value = res.json().await.unwrap();
    assert_eq!(lista.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn validacao_devolve_detalhes_por_campo() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_token("admin", Uuid::new_v4());

    let res = client
        .post(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "name": "", "price": 10.0, "stock": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Um ou mais campos são inválidos.");
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["stock"].is_array());
}

#[tokio::test]
async fn estoque_nao_entra_na_atualizacao_de_produto() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_token("admin", Uuid::new_v4());

    let produto = create_product(&client, &srv.base_url, &admin, "Caderno", 10).await;
    let produto_id = produto["id"].as_str().unwrap();

    // "stock" no corpo do PATCH é ignorado; o razão é o único caminho.
    let res = client
        .patch(format!("{}/inventory/products/{produto_id}", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Caderno pautado", "stock": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let atualizado: Value = res.json().await.unwrap();
    assert_eq!(atualizado["name"], "Caderno pautado");
    assert_eq!(atualizado["stock"], 10);
}

#[tokio::test]
async fn busca_e_filtros_de_catalogo() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_token("admin", Uuid::new_v4());

    create_product(&client, &srv.base_url, &admin, "Café torrado", 0).await;
    create_product(&client, &srv.base_url, &admin, "Filtro de papel", 1).await;
    create_product(&client, &srv.base_url, &admin, "Garrafa térmica", 50).await;

    // Busca por substring, sem caixa.
    let res = client
        .get(format!("{}/inventory/products/search?query=CAFÉ", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let achados: Value = res.json().await.unwrap();
    assert_eq!(achados.as_array().unwrap().len(), 1);
    assert_eq!(achados[0]["name"], "Café torrado");

    // Sem termo, devolve tudo.
    let res = client
        .get(format!("{}/inventory/products/search", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let todos: Value = res.json().await.unwrap();
    assert_eq!(todos.as_array().unwrap().len(), 3);

    // Zerados: só o café.
    let res = client
        .get(format!("{}/inventory/products/out-of-stock", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let zerados: Value = res.json().await.unwrap();
    assert_eq!(zerados.as_array().unwrap().len(), 1);
    assert_eq!(zerados[0]["name"], "Café torrado");

    // Abaixo ou igual ao mínimo (minStock = 2): café (0) e filtro (1).
    let res = client
        .get(format!("{}/inventory/products/low-stock", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let baixos: Value = res.json().await.unwrap();
    assert_eq!(baixos.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn categoria_de_outro_tenant_nao_vincula_produto() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin1 = mint_token("admin", Uuid::new_v4());
    let admin2 = mint_token("admin", Uuid::new_v4());

    let res = client
        .post(format!("{}/inventory/categories", srv.base_url))
        .bearer_auth(&admin1)
        .json(&json!({ "name": "Papelaria" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let categoria: Value = res.json().await.unwrap();
    let categoria_id = categoria["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/inventory/products", srv.base_url))
        .bearer_auth(&admin2)
        .json(&json!({ "name": "Lápis", "price": 1.5, "categoryId": categoria_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Categoria não encontrada.");
}

#[tokio::test]
async fn painel_reflete_o_razao() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_token("admin", Uuid::new_v4());

    let produto = create_product(&client, &srv.base_url, &admin, "Caderno", 10).await;
    let produto_id = produto["id"].as_str().unwrap();
    create_product(&client, &srv.base_url, &admin, "Borracha", 1).await;

    client
        .post(format!("{}/inventory/movements", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "productId": produto_id, "type": "out", "quantity": 4 }))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/inventory/dashboard/overview", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let overview: Value = res.json().await.unwrap();
    assert_eq!(overview["totalProducts"], 2);
    assert_eq!(overview["activeProducts"], 2);
    // 6 do caderno + 1 da borracha.
    assert_eq!(overview["totalStock"], 7);
    assert_eq!(overview["recentMovements"].as_array().unwrap().len(), 1);

    // Borracha (1 < 2) entra no alerta; caderno (6 >= 2) não.
    let res = client
        .get(format!("{}/inventory/dashboard/alerts", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let alertas: Value = res.json().await.unwrap();
    assert_eq!(alertas.as_array().unwrap().len(), 1);
    assert_eq!(alertas[0]["name"], "Borracha");

    let res = client
        .get(format!("{}/inventory/dashboard/trends", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let trends: Value = res.json().await.unwrap();
    assert_eq!(trends[0]["name"], "Caderno");
    assert_eq!(trends[0]["totalQuantity"], 4);
}

#[tokio::test]
async fn rfid_por_patch_e_por_voz() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant = Uuid::new_v4();
    let admin = mint_token("admin", tenant);
    let funcionario = mint_token("employee", tenant);

    // Padrão desligado.
    let res = client
        .get(format!("{}/inventory/automation/rfid-mode", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let settings: Value = res.json().await.unwrap();
    assert_eq!(settings["rfidEnabled"], false);

    // Funcionário não grava.
    let res = client
        .patch(format!("{}/inventory/automation/rfid-mode", srv.base_url))
        .bearer_auth(&funcionario)
        .json(&json!({ "enabled": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admin grava; a leitura reflete.
    let res = client
        .patch(format!("{}/inventory/automation/rfid-mode", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "enabled": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/inventory/automation/rfid-mode", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let settings: Value = res.json().await.unwrap();
    assert_eq!(settings["rfidEnabled"], true);

    // Comando de voz desliga pela mesma gravação persistida.
    let res = client
        .post(format!("{}/inventory/automation/voice-command", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "command": "Desativar RFID" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["rfidEnabled"], false);

    let res = client
        .get(format!("{}/inventory/automation/rfid-mode", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let settings: Value = res.json().await.unwrap();
    assert_eq!(settings["rfidEnabled"], false);

    // Voz com dica de ação para o painel.
    let res = client
        .post(format!("{}/inventory/automation/voice-to-action", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "command": "quero ver o estoque" }))
        .send()
        .await
        .unwrap();
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["action"], "dashboard.overview");
}
