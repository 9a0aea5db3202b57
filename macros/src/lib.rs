use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, ItemFn};

/// Marks a test that runs both natively and under `wasm-bindgen-test`.
///
/// Sync functions become plain `#[test]`s. `async fn` tests are driven on a
/// current-thread tokio runtime inside a `LocalSet`, so `spawn_local` based
/// schedulers work without extra setup.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let raw_args = proc_macro2::TokenStream::from(attr);
  if !raw_args.is_empty() {
    return TokenStream::from(
      syn::Error::new(raw_args.span(), "rxlite_macro::test takes no arguments")
        .to_compile_error(),
    );
  }

  if input.sig.asyncness.is_none() {
    return TokenStream::from(quote! {
      #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
      #[cfg_attr(not(target_arch = "wasm32"), test)]
      #input
    });
  }

  let attrs = &input.attrs;
  let vis = &input.vis;
  let name = &input.sig.ident;
  let body = &input.block;

  let expanded = quote! {
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test::wasm_bindgen_test(async)]
    #input

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    #(#attrs)*
    #vis fn #name() {
      let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build the test runtime");
      tokio::task::LocalSet::new().block_on(&runtime, async move #body)
    }
  };

  TokenStream::from(expanded)
}
