// Macro borrowed from https://github.com/hyperium/hyper
// hyper is provided under the MIT license. See LICENSE.

// Items gated on a cargo feature, marked as such in the docs.
macro_rules! cfg_feature {
    (
        #![$meta:meta]
        $($item:item)*
    ) => {
        $(
            #[cfg($meta)]
            #[cfg_attr(docsrs, doc(cfg($meta)))]
            $item
        )*
    }
}
