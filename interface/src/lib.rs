/*!
# dm-control interface

Interface definition between the modal command engine and its clients.

Data is passed to a client by invoking [Read::read] on the client.

Data is taken from a client by invoking [Write::write] on the client.

The client state is updated by invoking [Update::update] on the client.
*/

use std::any::type_name;

mod data;
pub use data::Data;
pub use dos_uid_derive::UID;

/// Defines the data type associated with unique identifier data type
pub trait UniqueIdentifier: Send + Sync {
    type DataType: Send + Sync;
}
impl UniqueIdentifier for () {
    type DataType = ();
}

/// Client state update interface
pub trait Update: Send + Sync {
    fn update(&mut self) {}
}
/// Client input data reader interface
pub trait Read<U: UniqueIdentifier>: Update {
    /// Read data from an input
    fn read(&mut self, data: Data<U>);
}
/// Client output data writer interface
pub trait Write<U: UniqueIdentifier>: Update {
    fn write(&mut self) -> Option<Data<U>>;
}
/// Interface for IO data sizes
pub trait Size<U: UniqueIdentifier>: Update {
    fn len(&self) -> usize;
}

use log::{info, warn};

/// Pretty prints error message
pub fn print_info<S: Into<String>>(msg: S, e: Option<&dyn std::error::Error>) {
    if let Some(e) = e {
        let mut msg: Vec<String> = vec![msg.into()];
        msg.push(format!("{}", e));
        let mut current = e.source();
        while let Some(cause) = current {
            msg.push(format!("{}", cause));
            current = cause.source();
        }
        warn!("{}", msg.join("\n .due to: "))
    } else {
        info!("{}", msg.into())
    }
}

/// Returns the type name of `T` stripped of its module path
pub fn trim_type_name<T>() -> String {
    fn trim(name: &str) -> String {
        if let Some((prefix, suffix)) = name.split_once('<') {
            let generics: Vec<_> = suffix.split(',').map(trim).collect();
            format!("{}<{}", trim(prefix), generics.join(","))
        } else if let Some((_, suffix)) = name.rsplit_once("::") {
            suffix.into()
        } else {
            name.into()
        }
    }
    trim(type_name::<T>())
}

/**
Clients chain

Apply the traits [Read], [Update] and [Write] (and in that order)
to a client:
```ignore
chain!(
    input_uid: input_data;
    client;
    output_uid: output_data);
```
The output binding is an `Option<Data<output_uid>>`.
*/
#[macro_export]
macro_rules! chain {
    ($r:ty:$vr:expr;$e:expr) => {
        <_ as ::interface::Read<$r>>::read($e, $vr);
        <_ as ::interface::Update>::update($e);
    };
    ($e:expr;$w:ty:$vw:ident) => {
        let $vw = {
            <_ as ::interface::Update>::update($e);
            <_ as ::interface::Write<$w>>::write($e)
        };
    };
    ($r:ty:$vr:expr;$e:expr;$w:ty:$vw:ident) => {
        let $vw = {
            <_ as ::interface::Read<$r>>::read($e, $vr);
            <_ as ::interface::Update>::update($e);
            <_ as ::interface::Write<$w>>::write($e)
        };
    };
}
