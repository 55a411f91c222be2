//! Command parsing and dispatch.
//!
//! The same [`Command`] set runs one-shot from the `sabor` binary and inside
//! the interactive shell. The shell adds cart and cashier commands, which only
//! make sense while the process keeps its state.

use std::future::Future;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use sabor_core::catalog::{ProductFilter, parse_price_bound};
use sabor_core::fetch::ViewGeneration;
use sabor_core::pricing::project_discounts;
use sabor_core::{PendingOrderId, Price, ProductId, Storage};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::auth::{self, LoginForm, RegisterForm};
use crate::services::catalog::{self, Carousel, HeroCarousel};
use crate::services::health;
use crate::services::modules::available_modules;
use crate::state::AppState;
use crate::storage::FileStorage;
use crate::views::{
    CartView, HealthView, IdentityView, MenuView, ModulesView, OffersView, PendingOrderView,
    PendingOrdersView, ProductDetailView, ProductListView, QuickSaleView, ReceiptView, TicketView,
    UsersView,
};

const PROMPT: &str = "sabor> ";
/// Asked before reading a password from the terminal. The terminal echoes
/// what is typed.
pub const PASSWORD_PROMPT: &str = "Contraseña (se mostrará al escribir): ";
const BANNER: &str = "Sabor & Fuego. Escribe 'help' para ver los comandos.\n";
const WELCOME: &str = "¡Bienvenido! ¿Cómo quieres entrar?\n  \
    login --correo <correo>   Soy cliente\n  \
    register ...              Me registro\n  \
    visit                     Entrar como visita\n";
const CANCELLED: &str = "Cancelado.";

// =============================================================================
// Commands
// =============================================================================

/// Commands available both one-shot and in the shell.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List products, optionally filtered
    Products(ProductsArgs),
    /// Show one product
    Product { id: i32 },
    /// Products grouped by category
    Menu,
    /// Discounted products with the home carousels
    Offers {
        /// Advance the carousels one tick before showing them
        #[arg(long)]
        next: bool,
    },
    /// Registered users
    Users,
    /// Check whether the backend is reachable
    Health,
    /// Sign in
    Login(LoginArgs),
    /// Create a client account
    Register(RegisterArgs),
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Staff modules available to the signed-in role
    Modules,
}

/// Product list filters.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductsArgs {
    /// Case-insensitive part of the product name
    #[arg(long)]
    pub search: Option<String>,
    /// Preselected category
    #[arg(long)]
    pub category: Option<String>,
    /// Lowest price
    #[arg(long)]
    pub min: Option<String>,
    /// Highest price
    #[arg(long)]
    pub max: Option<String>,
}

impl ProductsArgs {
    /// Build the product filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadInput` for a price bound that is not a number.
    pub fn filter(&self) -> Result<ProductFilter> {
        let mut filter = ProductFilter::with_category(self.category.as_deref());
        if let Some(search) = &self.search {
            filter.search.clone_from(search);
        }
        if let Some(min) = price_bound(self.min.as_deref())? {
            filter.min_price = min;
        }
        if let Some(max) = price_bound(self.max.as_deref())? {
            filter.max_price = max;
        }
        Ok(filter)
    }
}

fn price_bound(input: Option<&str>) -> Result<Option<Price>> {
    let Some(text) = input else {
        return Ok(None);
    };
    match parse_price_bound(text) {
        Some(price) => Ok(Some(price)),
        None if text.trim().is_empty() => Ok(None),
        None => Err(AppError::BadInput(format!("Precio inválido: {text}"))),
    }
}

/// Sign-in arguments.
#[derive(Clone, Args)]
pub struct LoginArgs {
    #[arg(long, default_value = "")]
    pub correo: String,
    /// Asked for interactively when omitted
    #[arg(long)]
    pub password: Option<String>,
    /// Keep the session across restarts
    #[arg(long)]
    pub remember: bool,
}

impl std::fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArgs")
            .field("correo", &self.correo)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("remember", &self.remember)
            .finish()
    }
}

/// Registration arguments.
#[derive(Clone, Args)]
pub struct RegisterArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub correo: String,
    #[arg(long, default_value = "")]
    pub password: String,
    #[arg(long, default_value = "")]
    pub confirm: String,
}

impl std::fmt::Debug for RegisterArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterArgs")
            .field("name", &self.name)
            .field("correo", &self.correo)
            .field("password", &"[REDACTED]")
            .field("confirm", &"[REDACTED]")
            .finish()
    }
}

/// One line typed into the shell.
#[derive(Debug, Parser)]
#[command(name = "sabor", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Common(Command),
    /// Add a product to the cart
    Add {
        id: i32,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line
    Qty { id: i32, quantity: u32 },
    /// Remove a cart line
    Remove { id: i32 },
    /// Show the cart
    Cart,
    /// Empty the cart
    Clear,
    /// Open or close the cart
    Toggle,
    /// Register: ring up one unit of a quick-sale item
    Ring { id: i32 },
    /// Register: drop a ticket line
    Void { id: i32 },
    /// Register: show the quick-sale menu and the ticket
    Ticket,
    /// Register: process the ticket
    Checkout,
    /// Register: remote orders waiting for approval
    Orders,
    /// Register: open a remote order
    Open { id: i32 },
    /// Register: close the opened remote order
    Close,
    /// Register: accept a remote order and send it to the kitchen
    Accept { id: i32 },
    /// Register: cancel a remote order
    Cancel {
        id: i32,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        reason: Vec<String>,
    },
    /// Continue as a visitor and show the menu
    Visit,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

// =============================================================================
// Shell
// =============================================================================

/// Runs commands against one [`AppState`].
#[derive(Debug)]
pub struct Shell<D: Storage = FileStorage> {
    state: AppState<D>,
    offer_count: usize,
    carousel: Carousel,
    hero: HeroCarousel,
}

impl<D: Storage> Shell<D> {
    #[must_use]
    pub const fn new(state: AppState<D>) -> Self {
        Self {
            state,
            offer_count: 0,
            carousel: Carousel::new(0),
            hero: HeroCarousel::new(0),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState<D> {
        &self.state
    }

    pub fn into_state(self) -> AppState<D> {
        self.state
    }

    /// Run one command and return what to show.
    ///
    /// # Errors
    ///
    /// Returns the command's error; the caller shows
    /// [`AppError::user_message`].
    pub async fn execute(&mut self, command: Command) -> Result<String> {
        debug!(?command, "Executing command");
        match command {
            Command::Products(args) => self.products(&args).await,
            Command::Product { id } => self.product(ProductId::new(id)).await,
            Command::Menu => self.menu().await,
            Command::Offers { next } => self.offers(next).await,
            Command::Users => self.users().await,
            Command::Health => Ok(self.health().await),
            Command::Login(args) => self.login(args).await,
            Command::Register(args) => self.register(args).await,
            Command::Logout => self.logout(),
            Command::Whoami => Ok(IdentityView::from(self.state.session().identity()).to_string()),
            Command::Modules => {
                let modules = available_modules(self.state.session().role());
                Ok(ModulesView::from(modules.as_slice()).to_string())
            }
        }
    }

    /// Read commands from `input` until `exit` or end of input.
    ///
    /// Command errors are shown and the loop goes on; only I/O errors on
    /// `input` or `output` end it early.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(BANNER.as_bytes()).await?;
        let session = self.state.session();
        if !session.is_authenticated() && !session.welcome_choice_made() {
            output.write_all(WELCOME.as_bytes()).await?;
        }

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let words = line.split_whitespace().collect::<Vec<_>>();
            if words.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    write_reply(output, &e.render().to_string()).await?;
                    continue;
                }
            };

            let reply = match command {
                ShellCommand::Exit => break,
                ShellCommand::Common(Command::Login(mut args)) if args.password.is_none() => {
                    output.write_all(PASSWORD_PROMPT.as_bytes()).await?;
                    output.flush().await?;
                    args.password = lines.next_line().await?;
                    self.execute(Command::Login(args)).await
                }
                command => self.dispatch(command).await,
            };

            let text = reply.unwrap_or_else(|e| {
                e.report();
                e.user_message()
            });
            write_reply(output, &text).await?;
        }

        info!("Shell closed");
        Ok(())
    }

    async fn dispatch(&mut self, command: ShellCommand) -> Result<String> {
        match command {
            ShellCommand::Common(command) => self.execute(command).await,
            ShellCommand::Exit => Ok(String::new()),
            ShellCommand::Visit => self.visit().await,

            ShellCommand::Add { id, quantity } => self.add_to_cart(ProductId::new(id), quantity).await,
            ShellCommand::Qty { id, quantity } => {
                self.state.cart_mut().set_quantity(ProductId::new(id), quantity)?;
                Ok(self.cart_view())
            }
            ShellCommand::Remove { id } => {
                let id = ProductId::new(id);
                self.state.cart_mut().remove_item(id);
                add_breadcrumb(
                    "cart",
                    "Removed from cart",
                    Some(&[("product_id", id.to_string().as_str())][..]),
                );
                Ok(self.cart_view())
            }
            ShellCommand::Cart => Ok(self.cart_view()),
            ShellCommand::Clear => {
                self.state.cart_mut().clear();
                add_breadcrumb("cart", "Cleared cart", None);
                Ok(self.cart_view())
            }
            ShellCommand::Toggle => {
                self.state.cart_mut().toggle_visibility();
                Ok(self.cart_view())
            }

            ShellCommand::Ring { id } => {
                let desk = self.state.cashier()?;
                desk.ring_up(ProductId::new(id))?;
                Ok(TicketView(desk.order()).to_string())
            }
            ShellCommand::Void { id } => {
                let desk = self.state.cashier()?;
                desk.void(ProductId::new(id));
                Ok(TicketView(desk.order()).to_string())
            }
            ShellCommand::Ticket => {
                let desk = self.state.cashier()?;
                Ok(format!("{}{}", QuickSaleView(desk.menu()), TicketView(desk.order())))
            }
            ShellCommand::Checkout => {
                let receipt = self.state.cashier()?.checkout()?;
                Ok(ReceiptView(&receipt).to_string())
            }
            ShellCommand::Orders => Ok(PendingOrdersView(self.state.cashier()?.inbox()).to_string()),
            ShellCommand::Open { id } => {
                let order = self.state.cashier()?.open_order(PendingOrderId::new(id))?;
                Ok(PendingOrderView(order).to_string())
            }
            ShellCommand::Close => {
                self.state.cashier()?.close_order();
                Ok("Detalle cerrado.".to_string())
            }
            ShellCommand::Accept { id } => {
                let order = self.state.cashier()?.accept(PendingOrderId::new(id))?;
                Ok(format!("Pedido #{} aceptado y enviado a cocina.", order.id))
            }
            ShellCommand::Cancel { id, reason } => {
                let order = self
                    .state
                    .cashier()?
                    .cancel(PendingOrderId::new(id), &reason.join(" "))?;
                Ok(format!("Pedido #{} cancelado.", order.id))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    async fn products(&mut self, args: &ProductsArgs) -> Result<String> {
        let filter = args.filter()?;
        let api = self.state.api().clone();
        let Some(products) = load(&mut self.state.views.products, catalog::list_products(&api)).await else {
            return Ok(CANCELLED.to_string());
        };
        Ok(ProductListView::new(&products, &filter).to_string())
    }

    async fn product(&mut self, id: ProductId) -> Result<String> {
        let api = self.state.api().clone();
        let Some(product) = load(&mut self.state.views.product, catalog::product_detail(&api, id)).await else {
            return Ok(CANCELLED.to_string());
        };
        Ok(ProductDetailView::from(product.as_ref()).to_string())
    }

    async fn menu(&mut self) -> Result<String> {
        let api = self.state.api().clone();
        let Some(products) = load(&mut self.state.views.menu, catalog::list_products(&api)).await else {
            return Ok(CANCELLED.to_string());
        };
        Ok(MenuView::from(products.as_slice()).to_string())
    }

    async fn offers(&mut self, next: bool) -> Result<String> {
        let api = self.state.api().clone();
        let Some(products) = load(&mut self.state.views.home, catalog::list_products(&api)).await else {
            return Ok(CANCELLED.to_string());
        };

        let offers = project_discounts(&products);
        let hero_offers = catalog::hero_offers(&products);
        if offers.len() != self.offer_count {
            self.offer_count = offers.len();
            self.carousel = Carousel::new(offers.len());
            self.hero = HeroCarousel::new(hero_offers.len());
        }
        if next {
            self.carousel.advance();
            self.hero.advance();
        }

        Ok(OffersView::new(&hero_offers, &self.hero, &offers, &self.carousel).to_string())
    }

    async fn users(&mut self) -> Result<String> {
        let api = self.state.api().clone();
        let Some(users) = load(&mut self.state.views.users, catalog::list_users(&api)).await else {
            return Ok(CANCELLED.to_string());
        };
        Ok(UsersView::from(users.as_slice()).to_string())
    }

    async fn health(&mut self) -> String {
        let status = health::check(self.state.api()).await;
        self.state.set_api_status(status);
        HealthView(status).to_string()
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    async fn login(&mut self, args: LoginArgs) -> Result<String> {
        let form = LoginForm {
            correo: args.correo,
            password: args.password.unwrap_or_default(),
            remember: args.remember,
        };

        let (api, session) = self.state.api_and_session();
        let outcome = auth::login(api, session, &form).await?;
        self.state.use_token(outcome.token);
        self.state.views.invalidate_all();

        Ok(format!(
            "Bienvenido, {}. Continúa en {}",
            outcome.identity.name, outcome.redirect
        ))
    }

    async fn register(&mut self, args: RegisterArgs) -> Result<String> {
        let form = RegisterForm {
            name: args.name,
            correo: args.correo,
            password: args.password,
            confirm: args.confirm,
        };

        let outcome = auth::register(self.state.api(), &form).await?;
        let message = outcome
            .message
            .unwrap_or_else(|| "Usuario registrado.".to_string());
        Ok(format!("{message} Continúa en {}", outcome.redirect))
    }

    async fn visit(&mut self) -> Result<String> {
        if let Err(e) = self.state.session_mut().make_welcome_choice() {
            warn!(error = %e, "Failed to remember the welcome choice");
        }
        add_breadcrumb("auth", "Continued as visitor", None);
        self.menu().await
    }

    fn logout(&mut self) -> Result<String> {
        let result = auth::logout(self.state.session_mut());
        self.state.forget_user();
        let route = result?;
        Ok(format!("Sesión cerrada. Continúa en {route}"))
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    async fn add_to_cart(&mut self, id: ProductId, quantity: u32) -> Result<String> {
        let api = self.state.api().clone();
        let product = catalog::product_detail(&api, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;
        self.state.cart_mut().add_item(&product, quantity)?;
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(
                &[
                    ("product_id", id.to_string().as_str()),
                    ("quantity", quantity.to_string().as_str()),
                ][..],
            ),
        );
        Ok(self.cart_view())
    }

    fn cart_view(&self) -> String {
        CartView::from(self.state.cart()).to_string()
    }
}

/// Run a view load, giving up on Ctrl-C.
///
/// `None` when the load was cancelled or its ticket went stale.
async fn load<T>(view: &mut ViewGeneration, fetch: impl Future<Output = T>) -> Option<T> {
    let ticket = view.begin();
    tokio::select! {
        value = fetch => view.accept(ticket, value),
        _ = tokio::signal::ctrl_c() => {
            view.invalidate();
            info!("Load cancelled");
            None
        }
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use sabor_core::session::keys;
    use sabor_core::{Identity, MemoryStorage, Role, UserId};
    use std::time::Duration;
    use url::Url;

    fn parse(line: &str) -> ShellCommand {
        ShellLine::try_parse_from(line.split_whitespace()).unwrap().command
    }

    fn shell(identity: Option<&Identity>) -> Shell<MemoryStorage> {
        let api = ApiClient::new(&Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(1)).unwrap();
        let mut durable = MemoryStorage::new();
        if let Some(identity) = identity {
            durable
                .set_item(keys::USER, &serde_json::to_string(identity).unwrap())
                .unwrap();
        }
        Shell::new(AppState::new(api, durable))
    }

    async fn run_script(shell: &mut Shell<MemoryStorage>, script: &str) -> String {
        let mut output = Vec::new();
        shell.run(script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    fn cashier() -> Identity {
        Identity {
            id: UserId::new(3),
            name: "Camila".to_string(),
            email: "camila@saboryfuego.cl".to_string(),
            role: Role::Cashier,
        }
    }

    #[test]
    fn test_parse_common_and_shell_commands() {
        assert!(matches!(parse("whoami"), ShellCommand::Common(Command::Whoami)));
        assert!(matches!(
            parse("product 7"),
            ShellCommand::Common(Command::Product { id: 7 })
        ));
        assert!(matches!(parse("add 3"), ShellCommand::Add { id: 3, quantity: 1 }));
        assert!(matches!(parse("qty 3 4"), ShellCommand::Qty { id: 3, quantity: 4 }));
        assert!(matches!(parse("quit"), ShellCommand::Exit));
    }

    #[test]
    fn test_parse_cancel_reason_words() {
        let ShellCommand::Cancel { id, reason } = parse("cancel 202 cliente se fue") else {
            panic!("expected cancel");
        };
        assert_eq!(id, 202);
        assert_eq!(reason.join(" "), "cliente se fue");
    }

    #[test]
    fn test_products_filter_args() {
        let args = ProductsArgs {
            search: Some("chu".to_string()),
            min: Some("1000".to_string()),
            max: Some(" ".to_string()),
            ..ProductsArgs::default()
        };
        let filter = args.filter().unwrap();
        assert_eq!(filter.search, "chu");
        assert_eq!(filter.min_price, Price::from(1000));
        assert_eq!(filter.max_price, Price::from(sabor_core::catalog::DEFAULT_MAX_PRICE));

        let args = ProductsArgs {
            min: Some("mil".to_string()),
            ..ProductsArgs::default()
        };
        assert!(matches!(args.filter(), Err(AppError::BadInput(_))));
    }

    #[test]
    fn test_login_args_debug_redacts_password() {
        let args = LoginArgs {
            correo: "ana@saboryfuego.cl".to_string(),
            password: Some("hunter22".to_string()),
            remember: false,
        };
        assert!(!format!("{args:?}").contains("hunter22"));
    }

    #[tokio::test]
    async fn test_shell_stops_at_exit() {
        let mut shell = shell(None);
        let output = run_script(&mut shell, "whoami\n\nexit\nwhoami\n").await;
        assert_eq!(output.matches("No has iniciado sesión.").count(), 1);
    }

    #[tokio::test]
    async fn test_welcome_shown_until_visitor_chooses() {
        let mut visitor = shell(None);
        let output = run_script(&mut visitor, "exit\n").await;
        assert!(output.contains("Entrar como visita"));

        visitor.state.session_mut().make_welcome_choice().unwrap();
        let output = run_script(&mut visitor, "exit\n").await;
        assert!(!output.contains("Entrar como visita"));

        let mut staff = shell(Some(&cashier()));
        let output = run_script(&mut staff, "exit\n").await;
        assert!(!output.contains("Entrar como visita"));
    }

    #[tokio::test]
    async fn test_visit_records_choice() {
        let mut visitor = shell(None);
        let output = run_script(&mut visitor, "visit\n").await;
        assert!(visitor.state().session().welcome_choice_made());
        assert!(!output.contains("error: unrecognized subcommand"));
    }

    #[tokio::test]
    async fn test_modules_by_role() {
        let mut staff = shell(Some(&cashier()));
        let output = staff.execute(Command::Modules).await.unwrap();
        assert!(output.contains("Caja"));
        assert!(!output.contains("Usuarios"));

        let mut visitor = shell(None);
        let output = visitor.execute(Command::Modules).await.unwrap();
        assert_eq!(output, "No tienes módulos disponibles.");
    }

    #[tokio::test]
    async fn test_password_prompt_says_input_is_visible() {
        let mut visitor = shell(None);
        let output = run_script(&mut visitor, "login --correo ana@saboryfuego.cl\nsecreto1\n").await;
        assert!(output.contains(PASSWORD_PROMPT));
        assert!(PASSWORD_PROMPT.contains("se mostrará"));
    }

    #[tokio::test]
    async fn test_shell_reports_unknown_command() {
        let mut shell = shell(None);
        let output = run_script(&mut shell, "bailar\n").await;
        assert!(output.contains("bailar"));
    }

    #[tokio::test]
    async fn test_shell_cart_rejects_zero_quantity() {
        let mut shell = shell(None);
        let output = run_script(&mut shell, "qty 1 0\ncart\n").await;
        assert!(output.contains("La cantidad debe ser al menos 1."));
        assert!(output.contains("Tu carrito está vacío."));
    }

    #[tokio::test]
    async fn test_shell_register_needs_cashier() {
        let mut shell = shell(None);
        let output = run_script(&mut shell, "ring 1\n").await;
        assert!(output.contains("Acceso denegado"));
    }

    #[tokio::test]
    async fn test_shell_register_flow() {
        let mut shell = shell(Some(&cashier()));
        let output = run_script(
            &mut shell,
            "ring 1\nring 1\nring 3\nvoid 3\ncheckout\ncheckout\ncancel 202\ncancel 202 mesa vacía\norders\n",
        )
        .await;

        assert!(output.contains("Venta #101 procesada"));
        assert!(output.contains("Total: $29.75"));
        assert!(output.contains("El pedido está vacío. Agregue productos."));
        assert!(output.contains("Pedido #202 cancelado."));
        assert!(output.contains("Pedidos Remotos Pendientes (1)"));
    }
}
