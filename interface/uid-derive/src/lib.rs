/*!
# UID

A derive macro that implements the [UniqueIdentifier] trait.

## Examples

Setting the data type to the default value `Vec<f64>`:
```
use interface::UID;

#[derive(UID)]
enum ModalCoefficients {}
```

The data type is set with:
```
use interface::UID;

#[derive(UID)]
#[uid(data = Vec<usize>)]
enum ActiveModes {}
```

[UniqueIdentifier]: ../interface/trait.UniqueIdentifier.html
*/

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(UID, attributes(uid))]
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    Parser::new(&input)
        .map_or_else(syn::Error::into_compile_error, |parser| {
            parser.uid_attrs.expand(&input)
        })
        .into()
}

mod uid;

/// Derive attributes parser
///
/// #[uid(...)]
#[derive(Clone, Default)]
struct Parser {
    pub uid_attrs: uid::Attributes,
}

impl Parser {
    fn new(input: &DeriveInput) -> syn::Result<Parser> {
        let mut parser: Parser = Default::default();
        for attr in &input.attrs {
            if attr.path().is_ident("uid") {
                parser.uid_attrs = attr.parse_args()?;
            }
        }
        Ok(parser)
    }
}

type Expanded = proc_macro2::TokenStream;

trait Expand {
    fn expand(&self, input: &DeriveInput) -> Expanded;
}
