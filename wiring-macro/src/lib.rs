use proc_macro::TokenStream;

mod injectable;
mod module;
mod runtime_service;

/// Derive macro recording a struct's scope and dependencies for the DI container
///
/// Every field must be an `Arc<T>`. A field is resolved through `T`'s type token
/// unless `#[inject(TOKEN)]` names another token. The default scope is singleton.
///
/// # Example
/// ```ignore
/// use wiring::Injectable;
///
/// #[derive(Injectable)]
/// #[injectable(scope = "transient")]
/// pub struct UserService {
///     repository: Arc<UserRepository>,
///     #[inject(DATABASE_URL)]
///     url: Arc<String>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro marking a type as a runtime service
///
/// Marked types bound in an application's modules are resolved during `start`.
/// `participant` and `disposable` expose the type's `LifecycleParticipant` and
/// `Disposable` implementations.
///
/// # Example
/// ```ignore
/// use wiring::runtime_service;
///
/// #[derive(Injectable)]
/// #[runtime_service(participant, disposable)]
/// pub struct Indexer {
///     store: Arc<Store>,
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    runtime_service::runtime_service_attribute(attr, item)
}

/// Attribute macro declaring a module from imports and registrations
///
/// Generates `fn module() -> wiring::Result<wiring::Module>` on the annotated type.
/// A plain type path in `register` becomes a type registration; any other
/// expression must convert into a `Registration`.
///
/// # Example
/// ```ignore
/// use wiring::module;
///
/// #[module(
///     imports = [CoreModule],
///     register = [UserService, provide_value(&PORT, || 8080u16)],
/// )]
/// pub struct AppModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}
